use std::fmt;

/// Kind of a WebDAV resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A non-collection resource.
    File,
    /// A collection.
    Directory,
}

impl ResourceKind {
    pub fn is_dir(self) -> bool {
        matches!(self, ResourceKind::Directory)
    }
}

/// Properties of a single resource, as reported by PROPFIND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavStat {
    /// Absolute path of the resource on the server.
    pub filename: String,
    /// Last path segment.
    pub basename: String,
    /// File or collection.
    pub kind: ResourceKind,
    /// `getcontentlength`; zero for collections.
    pub size: u64,
    /// `getlastmodified`, an HTTP-date (RFC 1123) string.
    pub last_modified: String,
}

/// Authentication scheme used by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthType {
    #[default]
    None,
    Basic,
    Digest,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthType::None => "none",
            AuthType::Basic => "basic",
            AuthType::Digest => "digest",
        };
        f.write_str(name)
    }
}

/// Options a client is constructed with. Immutable once the client exists.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ClientOptions {
    pub auth_type: AuthType,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("auth_type", &self.auth_type)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Opaque token returned by a successful LOCK.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options for a PUT request.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Replace an existing resource. When false the server must refuse
    /// with 412 if the target exists.
    pub overwrite: bool,
    /// Lock token submitted in the `If` header.
    pub lock: Option<LockToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_options_debug_redacts_password() {
        let options = ClientOptions {
            auth_type: AuthType::Basic,
            username: Some("alice".into()),
            password: Some("hunter2".into()),
        };
        let printed = format!("{:?}", options);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_auth_type_display() {
        assert_eq!(AuthType::None.to_string(), "none");
        assert_eq!(AuthType::Digest.to_string(), "digest");
    }
}
