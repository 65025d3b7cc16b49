use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-level errors surfaced to callers.
///
/// Every variant names the offending path (or value) together with the cause.
#[derive(Debug, Error)]
pub enum Error {
    /// The file or directory does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The target already exists and the caller did not allow overwriting.
    #[error("file exists: {0}")]
    FileExists(String),

    /// A file operation was attempted on a directory.
    #[error("file is a directory: {0}")]
    FileIsADirectory(String),

    /// The operation spans two different endpoints.
    #[error("no permissions: {0}")]
    NoPermissions(String),

    /// The `authtype` query parameter names an unknown scheme.
    #[error("authentication type '{0}' is not supported")]
    UnsupportedAuthType(String),

    /// The URI could not be interpreted as a remote location.
    #[error("invalid uri '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Acquiring the write lock failed.
    #[error("lock failed on {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: davfs_proto::Error,
    },

    /// Any other protocol failure, passed through unchanged.
    #[error("{path}: {source}")]
    Protocol {
        path: String,
        #[source]
        source: davfs_proto::Error,
    },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Translate a protocol error raised while working on `path`.
    ///
    /// Only "not found" is reinterpreted; everything else passes through.
    pub fn from_protocol(path: &str, err: davfs_proto::Error) -> Self {
        if err.is_not_found() {
            Error::FileNotFound(path.to_string())
        } else {
            Error::Protocol {
                path: path.to_string(),
                source: err,
            }
        }
    }

    /// The path (or value) this error refers to, when it has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            Error::FileNotFound(path)
            | Error::FileExists(path)
            | Error::FileIsADirectory(path)
            | Error::NoPermissions(path)
            | Error::Lock { path, .. }
            | Error::Protocol { path, .. } => Some(path),
            Error::InvalidUri { uri, .. } => Some(uri),
            Error::UnsupportedAuthType(_) | Error::Config(_) => None,
        }
    }
}

/// Errors from loading a [`crate::DavFsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] toml::de::Error),
}

/// Result type for filesystem operations.
pub type Result<T> = std::result::Result<T, Error>;
