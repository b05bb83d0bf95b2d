pub mod context;
pub mod doctor;
pub mod init;
pub mod list;
pub mod save;
pub mod serve;

use anyhow::Context;
use jarvis_config::AppConfig;
use std::path::{Path, PathBuf};

/// The config file in effect: `--config` if given, else the default path.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config with `JARVIS_*` environment overrides applied.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    let path = config_path(explicit);
    AppConfig::load_with_env(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
