mod init;
mod schema;

pub use init::{default_config_yaml, write_default_config};
pub use schema::{Config, HistoryBackend, HistoryConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/bs-detector/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join("bs-detector"))
        .unwrap_or_else(|| PathBuf::from(".bs-detector"))
}

/// Get the default config file path (~/.config/bs-detector/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/bs-detector/config.yaml)
///
/// A missing file is not an error: every setting has a default.
///
/// # Errors
///
/// Returns an error if:
/// - The config file exists but cannot be read
/// - The YAML cannot be parsed or contains unknown fields
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        tracing::debug!("No config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}
