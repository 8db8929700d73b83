//! Configuration management for Tasker.
//!
//! Loads configuration from ${TASKER_HOME}/config.toml with sensible defaults.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::shared::resolve_base_url;

/// Env var overriding `[api] base_url`.
pub const API_URL_ENV: &str = "TASKER_API_URL";
/// Env var overriding `[identity] endpoint`.
pub const IDP_ENDPOINT_ENV: &str = "TASKER_IDP_ENDPOINT";

/// Embedded template written by `tasker config init`.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for Tasker configuration and data directories.
    //!
    //! TASKER_HOME resolution order:
    //! 1. TASKER_HOME environment variable (if set)
    //! 2. ~/.config/tasker (default)

    use std::path::PathBuf;

    /// Returns the Tasker home directory.
    ///
    /// Checks TASKER_HOME env var first, falls back to ~/.config/tasker
    pub fn tasker_home() -> PathBuf {
        if let Ok(home) = std::env::var("TASKER_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".tasker"),
            |h| h.join(".config").join("tasker"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tasker_home().join("config.toml")
    }

    /// Returns the directory holding per-user local task files.
    pub fn tasks_dir() -> PathBuf {
        tasker_home().join("tasks")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        tasker_home().join("logs")
    }
}

/// Where task data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Remote task API.
    Remote,
    /// Per-user JSON file under `${TASKER_HOME}/tasks`.
    Local,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageMode::Remote => "remote",
            StorageMode::Local => "local",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "remote" | "api" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            _ => Err(format!(
                "Unknown storage mode: {value} (expected remote or local)"
            )),
        }
    }
}

/// Identity provider (Cognito user pool) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub region: String,
    /// `<region>_<id>`; when set, its region must match `region`.
    pub user_pool_id: String,
    /// App client id; required for every provider call.
    pub client_id: String,
    /// Overrides the regional endpoint (mock servers, proxies).
    pub endpoint: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            region: Config::DEFAULT_REGION.to_string(),
            user_pool_id: String::new(),
            client_id: String::new(),
            endpoint: None,
        }
    }
}

impl IdentityConfig {
    /// Regional Cognito endpoint for the configured region.
    pub fn default_endpoint(&self) -> String {
        format!("https://cognito-idp.{}.amazonaws.com", self.region.trim())
    }

    /// Checks that the user pool id belongs to the configured region.
    /// An empty pool id is accepted.
    ///
    /// # Errors
    /// Returns an error for a malformed pool id or a region mismatch.
    pub fn check_user_pool(&self) -> Result<()> {
        let pool = self.user_pool_id.trim();
        if pool.is_empty() {
            return Ok(());
        }
        let Some((pool_region, id)) = pool.split_once('_') else {
            anyhow::bail!("Invalid user_pool_id '{pool}' (expected <region>_<id>)");
        };
        if pool_region.is_empty() || id.is_empty() {
            anyhow::bail!("Invalid user_pool_id '{pool}' (expected <region>_<id>)");
        }
        if pool_region != self.region.trim() {
            anyhow::bail!(
                "user_pool_id '{pool}' belongs to region {pool_region}, but region is {}",
                self.region.trim()
            );
        }
        Ok(())
    }

    /// Resolves the endpoint with precedence: env > config > regional default.
    ///
    /// # Errors
    /// Returns an error if the user pool does not match the region, or if the
    /// env or config value is not a valid URL.
    pub fn effective_endpoint(&self) -> Result<String> {
        self.check_user_pool()?;
        resolve_base_url(
            self.endpoint.as_deref(),
            IDP_ENDPOINT_ENV,
            &self.default_endpoint(),
            "identity provider",
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the task API, e.g. `https://abcd.execute-api.us-east-1.amazonaws.com/prod`.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit mode; inferred from `api.base_url` when unset.
    pub mode: Option<StorageMode>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub identity: IdentityConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
}

impl Config {
    const DEFAULT_REGION: &str = "us-east-1";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
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

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Task API base URL: env > config. `None` when neither is set.
    ///
    /// # Errors
    /// Returns an error if the configured value is not a valid URL.
    pub fn effective_api_url(&self) -> Result<Option<String>> {
        let url = resolve_base_url(self.api.base_url.as_deref(), API_URL_ENV, "", "task API")?;
        Ok(Some(url).filter(|u| !u.is_empty()))
    }

    /// Storage mode: explicit setting, else remote when an API URL is known,
    /// else local.
    ///
    /// # Errors
    /// Returns an error if the configured API URL is invalid.
    pub fn effective_storage_mode(&self) -> Result<StorageMode> {
        if let Some(mode) = self.storage.mode {
            return Ok(mode);
        }
        Ok(if self.effective_api_url()?.is_some() {
            StorageMode::Remote
        } else {
            StorageMode::Local
        })
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
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
