use anyhow::{bail, Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::Path;

use super::schema::{Config, HistoryConfig};
use crate::scoring::ScoringConfig;

const HEADER: &str = "\
# bs-detector configuration
#
# scoring.weights: score delta per rule (positive = more suspicious)
# scoring.patterns: case-insensitive regular expressions, matched anywhere in the claim
# history.backend: file | cache | memory
";

/// Render the default configuration as commented YAML.
pub fn default_config_yaml() -> Result<String> {
    let config = Config {
        scoring: Some(ScoringConfig::default()),
        history: Some(HistoryConfig::default()),
    };
    let body = serde_saphyr::to_string(&config).context("Failed to serialize default config")?;
    Ok(format!("{}\n{}", HEADER, body))
}

/// Write the default configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set. The file is
/// written atomically, so an interrupted write never leaves half a config.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }
    }

    let yaml = default_config_yaml()?;
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit().context("Failed to save config")?;

    Ok(())
}
