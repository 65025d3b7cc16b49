use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_SCHEME: &str = "webdav";

/// Adapter configuration.
///
/// ```toml
/// scheme = "webdav"
/// default_tls = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DavFsConfig {
    /// URI scheme the adapter is registered under.
    pub scheme: String,
    /// Use HTTPS when a URI carries no `ssl` parameter.
    pub default_tls: bool,
}

impl Default for DavFsConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            default_tls: true,
        }
    }
}

impl DavFsConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_default_tls(mut self, default_tls: bool) -> Self {
        self.default_tls = default_tls;
        self
    }
}
