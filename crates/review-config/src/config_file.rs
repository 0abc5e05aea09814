use crate::{ConfigError, Configuration};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".review-bot.toml";
const APP_DIR: &str = "review-bot";

/// Locate the config file
///
/// Searches for:
/// 1. `.review-bot.toml` in the current working directory
/// 2. `review-bot/config.toml` in the user's config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
        .filter(|path| path.is_file())
}

/// Load, default and validate the configuration at `path`
pub fn load_config(path: &Path) -> Result<Configuration, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Loaded config from {}", path.display());

    parse_config(&content)
}

/// Parse, default and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Configuration, ConfigError> {
    let mut config: Configuration = toml::from_str(content)?;
    config.set_default();
    config.validate()?;

    log::info!(
        "Loaded review config with {} item(s)",
        config.config_items.len()
    );
    Ok(config)
}
