use thiserror::Error;

/// Errors reported by a WebDAV protocol client.
///
/// Each variant corresponds to a response class a WebDAV server can
/// produce, so callers match on variants instead of raw status codes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// The resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// An intermediate collection is missing (409).
    #[error("conflict: parent collection of {0} does not exist")]
    Conflict(String),

    /// The destination exists and overwriting was not allowed (412).
    #[error("precondition failed: {0} already exists")]
    PreconditionFailed(String),

    /// The resource is locked by another lock token (423).
    #[error("resource is locked: {0}")]
    Locked(String),

    /// The server refused the operation (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Credentials were missing or rejected (401).
    #[error("authentication required")]
    Unauthorized,

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Any other unsuccessful status.
    #[error("server responded with status {status}: {message}")]
    Other { status: u16, message: String },
}

impl Error {
    /// Whether this error is the protocol's "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// HTTP status equivalent of this error, if it has one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound(_) => Some(404),
            Error::Conflict(_) => Some(409),
            Error::PreconditionFailed(_) => Some(412),
            Error::Locked(_) => Some(423),
            Error::Forbidden(_) => Some(403),
            Error::Unauthorized => Some(401),
            Error::Transport(_) => None,
            Error::Other { status, .. } => Some(*status),
        }
    }
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;
