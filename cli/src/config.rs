use std::fs;
use std::path::{Path, PathBuf};

use animal_core::{ErrorPolicy, IdRange};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `base_url` from the config file; `--base-url` overrides both.
pub const URL_ENV: &str = "ANIMAL_API_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server root or full collection URL.
    pub base_url: String,
    pub error_policy: ErrorPolicy,
    /// Range the add flow draws client-side ids from.
    pub id_range: IdRange,
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            error_policy: ErrorPolicy::default(),
            id_range: IdRange::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `animal-list/config.toml` under the platform config directory, or the
    /// current directory when there is none.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("animal-list").join("config.toml")
    }

    /// Load from `path`, or from [`Config::config_path`] when `None`.
    ///
    /// A missing default file yields `Config::default()`; a missing explicit
    /// file is an error. Does not validate, so overrides can be applied first.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        if !explicit && !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError { path, source: e })
    }

    pub fn apply_overrides(&mut self, env_url: Option<String>, cli_url: Option<String>, legacy_errors: bool) {
        if let Some(url) = cli_url.or(env_url) {
            self.base_url = url;
        }
        if legacy_errors {
            self.error_policy = ErrorPolicy::Legacy;
        }
    }

    /// Checks:
    /// - `base_url` is an http(s) URL with a host
    /// - `id_range` is non-empty and starts at 1 or above
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rest = self
            .base_url
            .strip_prefix("http://")
            .or_else(|| self.base_url.strip_prefix("https://"));
        match rest {
            Some(host) if !host.trim_matches('/').is_empty() => {}
            _ => {
                return Err(ConfigError::ValidationError {
                    message: format!("base_url '{}' must be an http(s) URL", self.base_url),
                })
            }
        }

        let IdRange { min, max } = self.id_range;
        if min < 1 || min > max {
            return Err(ConfigError::ValidationError {
                message: format!("id_range {min}..={max} must satisfy 1 <= min <= max"),
            });
        }

        Ok(())
    }
}
