//! `jarvis init` — Write a default config file.

use jarvis_config::AppConfig;
use std::path::Path;

pub fn run(explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let config_path = super::config_path(explicit);

    if config_path.exists() && !force {
        println!("  Config already exists: {}", config_path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&config_path, AppConfig::default_toml())?;

    println!("✅ Wrote {}", config_path.display());
    println!("   Next: `jarvis doctor`, then `jarvis serve`");
    Ok(())
}
