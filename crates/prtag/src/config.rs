//! Configuration loading
//!
//! Settings come from an optional `config.json`. An explicit path wins;
//! otherwise `<user config dir>/prtag/config.json` is used when present, and
//! built-in defaults apply when no file is found.

use crate::error::{PrtagError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the user config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Settings shared by both workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Executable used for signed tags and signed merges
    pub git_program: String,
    /// Remote consulted first when inferring the forge
    pub remote: String,
    /// Replaces `https://<host>` in provenance URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forge_base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            remote: "origin".to_string(),
            forge_base_url: None,
        }
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.git_program.trim().is_empty() {
            return Err(PrtagError::ConfigParse(
                "git_program must not be empty".to_string(),
            ));
        }
        if self.remote.trim().is_empty() {
            return Err(PrtagError::ConfigParse(
                "remote must not be empty".to_string(),
            ));
        }
        if let Some(base) = &self.forge_base_url {
            if !(base.starts_with("https://") || base.starts_with("http://")) {
                return Err(PrtagError::ConfigParse(format!(
                    "forge_base_url must be an http(s) URL: {base}"
                )));
            }
        }
        Ok(())
    }
}

/// Parse a configuration from a JSON string.
///
/// # Errors
///
/// Returns `PrtagError::ConfigParse` if the JSON is malformed, has unknown
/// fields, or holds invalid values.
pub fn load_config_from_str(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json)
        .map_err(|e| PrtagError::ConfigParse(format!("failed to parse config: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Parse a configuration from a JSON file.
///
/// # Errors
///
/// Returns `PrtagError::ConfigParse` if the file cannot be read or parsed.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        PrtagError::ConfigParse(format!("failed to read {}: {e}", path.display()))
    })?;
    load_config_from_str(&content)
}

/// `<user config dir>/prtag/config.json`, if a config dir exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("prtag").join(CONFIG_FILE_NAME))
}

/// Resolve the effective configuration.
///
/// # Errors
///
/// Returns `PrtagError::ConfigParse` if the selected file is unreadable or
/// invalid.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit_path {
        return load_config_from_file(path);
    }

    if let Some(path) = user_config_path() {
        if path.exists() {
            tracing::debug!("loading config from {}", path.display());
            return load_config_from_file(&path);
        }
    }

    Ok(Config::default())
}
