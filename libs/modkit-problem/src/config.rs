//! Configuration for the problem factory.
//!
//! Layered with figment, lowest to highest precedence:
//! 1. built-in defaults (`ProblemConfig::default()`)
//! 2. an optional YAML file
//! 3. environment variables prefixed with `PROBLEM__`, `__` separating nested keys,
//!    e.g. `PROBLEM__CLIENT_ERRORS__404__TITLE=Missing`
//!
//! Each `client_errors` entry is merged field by field over the starting table, so an
//! override that sets only `title` keeps the existing `link`.
//!
//! ```yaml
//! use_builtin_defaults: true
//! encode_trace_id: false
//! client_errors:
//!   "404":
//!     title: Not Found
//!     link: https://errors.example.com/not-found
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::catalog::{ClientErrorDefault, ClientErrorTable};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "PROBLEM__";

/// Configuration error for loading problem factory settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file '{}' not found", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to load problem config: {source}")]
    Load {
        #[source]
        source: Box<figment::Error>,
    },
    #[error("invalid status code '{key}' in client_errors")]
    InvalidStatus { key: String },
}

/// Partial client-error entry from config. Absent fields keep the table's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientErrorOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ClientErrorOverride {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    fn apply(&self, base: ClientErrorDefault) -> ClientErrorDefault {
        ClientErrorDefault {
            title: self.title.clone().unwrap_or(base.title),
            link: self.link.clone().unwrap_or(base.link),
        }
    }
}

/// Problem factory settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    /// Start from the built-in client-error table before applying `client_errors`.
    pub use_builtin_defaults: bool,
    /// HTML-encode the trace identifier before stamping it into `extensions`.
    pub encode_trace_id: bool,
    /// Status code (as a string key) -> title and link overrides.
    pub client_errors: BTreeMap<String, ClientErrorOverride>,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            use_builtin_defaults: true,
            encode_trace_id: false,
            client_errors: BTreeMap::new(),
        }
    }
}

impl ProblemConfig {
    /// Load settings from defaults, an optional YAML file and the environment.
    ///
    /// # Errors
    /// Returns `ConfigError::NotFound` if `path` is given but is not a file, and
    /// `ConfigError::Load` if any layer fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(&figment)
    }

    /// Extract settings from a figment owned by the host.
    ///
    /// # Errors
    /// Returns `ConfigError::Load` if the figment cannot be extracted.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::Load {
            source: Box::new(e),
        })?;
        tracing::info!(
            client_errors = config.client_errors.len(),
            use_builtin_defaults = config.use_builtin_defaults,
            encode_trace_id = config.encode_trace_id,
            "Loaded problem details configuration"
        );
        Ok(config)
    }

    /// Build the status -> default lookup table described by this config.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidStatus` if a key is not a status code in `100..=999`.
    pub fn client_error_table(&self) -> Result<ClientErrorTable, ConfigError> {
        let mut table = if self.use_builtin_defaults {
            ClientErrorTable::default()
        } else {
            ClientErrorTable::empty()
        };
        for (key, entry) in &self.client_errors {
            let status = key
                .trim()
                .parse::<u16>()
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .ok_or_else(|| ConfigError::InvalidStatus { key: key.clone() })?;
            let base = table.get(status).cloned().unwrap_or_default();
            table.insert(status, entry.apply(base));
        }
        Ok(table)
    }
}
