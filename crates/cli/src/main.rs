//! Jarvis CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write a default config file
//! - `serve`    — Start the HTTP gateway
//! - `list`     — List stored knowledge items
//! - `save`     — Create or replace a knowledge item from JSON
//! - `context`  — Build the ranked knowledge context for a prompt
//! - `doctor`   — Diagnose config and store health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "jarvis",
    about = "Jarvis — knowledge store and prompt context builder",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.jarvis/config.toml
    #[arg(short, long, global = true, env = "JARVIS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List knowledge items as JSON
    List {
        /// Only items of this module
        #[arg(short, long)]
        module: Option<String>,

        /// `active` (default) or `archived`
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of items
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create or replace a knowledge item from a JSON file (`-` for stdin)
    Save { file: PathBuf },

    /// Build the ranked knowledge context
    Context {
        /// Intent tag; repeat for several
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Maximum number of blocks
        #[arg(short, long)]
        max_items: Option<usize>,

        /// Print the prompt section instead of JSON blocks
        #[arg(short, long)]
        render: bool,
    },

    /// Diagnose config and store health
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Init { force } => commands::init::run(config_path, force)?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::List {
            module,
            status,
            limit,
        } => commands::list::run(config_path, module, status, limit).await?,
        Commands::Save { file } => commands::save::run(config_path, &file).await?,
        Commands::Context {
            tags,
            max_items,
            render,
        } => commands::context::run(config_path, tags, max_items, render).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
