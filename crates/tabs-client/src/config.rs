//! Configuration management for tabs.
//!
//! Loads configuration from ${TABS_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default backend base URL (the hosted deployment).
pub const DEFAULT_BASE_URL: &str = "https://budget-tracker-m7zk.onrender.com/api";

/// Environment variable that overrides the configured base URL.
pub const BASE_URL_ENV: &str = "TABS_API_URL";

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API base URL.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the effective base URL with precedence: env > config.
    ///
    /// # Errors
    /// Returns an error if an override is not a well-formed URL.
    pub fn resolve_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var(BASE_URL_ENV) {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                url::Url::parse(trimmed)
                    .with_context(|| format!("Invalid {BASE_URL_ENV} value: {trimmed}"))?;
                return Ok(normalize_base_url(trimmed));
            }
        }
        Ok(normalize_base_url(&self.base_url))
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        write_config(path, DEFAULT_CONFIG_TEMPLATE)
    }
}

/// Strips the trailing slash so request paths (which start with `/`) can be
/// appended directly.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Writes config content to a file, creating parent directories as needed.
/// Uses atomic write (temp file + rename) to prevent corruption.
fn write_config(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move config into place at {}", path.display()))?;
    Ok(())
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tabs configuration

# Backend API base URL. The TABS_API_URL environment variable takes
# precedence over this value.
base_url = "https://budget-tracker-m7zk.onrender.com/api"
"#;

pub mod paths {
    //! Path resolution for tabs configuration and data.
    //!
    //! TABS_HOME resolution order:
    //! 1. TABS_HOME environment variable (if set)
    //! 2. ~/.config/tabs (default)

    use std::path::PathBuf;

    /// Returns the tabs home directory.
    ///
    /// Checks TABS_HOME env var first, falls back to ~/.config/tabs
    pub fn tabs_home() -> PathBuf {
        if let Ok(home) = std::env::var("TABS_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("tabs"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tabs_home().join("config.toml")
    }

    /// Returns the path to the stored token pair.
    pub fn tokens_path() -> PathBuf {
        tabs_home().join(crate::credentials::FileCredentialStore::FILE_NAME)
    }
}
