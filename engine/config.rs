use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_MODELS_DIR: &str = "PREMIA_MODELS_DIR";
pub const ENV_BIND: &str = "PREMIA_BIND";
pub const ENV_LOG: &str = "PREMIA_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Bind address '{value}' is not a valid socket address: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Settings for the HTTP service.
///
/// Resolution order, later wins: built-in defaults, the optional TOML file,
/// `PREMIA_*` environment variables, then command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub models_dir: PathBuf,
    pub bind: String,
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            bind: "0.0.0.0:8000".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reads a TOML config file. Keys it leaves out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults, or the file at `path` when one is given, with the process
    /// environment applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env(|key| std::env::var(key).ok()))
    }

    /// Applies `PREMIA_*` overrides read through `lookup`. Empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(dir) = var(ENV_MODELS_DIR) {
            self.models_dir = PathBuf::from(dir);
        }
        if let Some(bind) = var(ENV_BIND) {
            self.bind = bind;
        }
        if let Some(filter) = var(ENV_LOG) {
            self.log_filter = filter;
        }
        self
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: self.bind.clone(),
                source,
            })
    }
}
