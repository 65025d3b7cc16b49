//! Capability traits implemented by WebDAV protocol clients.

use crate::error::Result;
use crate::types::{ClientOptions, DavStat, LockToken, PutOptions};
use bytes::Bytes;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Boxed future returned by every protocol operation.
pub type DavFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Operations a WebDAV client offers against a single origin.
///
/// Paths are absolute, percent-decoded server paths (`/dir/file.txt`).
/// Implementations must be safe to share between concurrent operations.
pub trait DavClient: Send + Sync {
    /// PROPFIND with depth 0.
    fn stat<'a>(&'a self, path: &'a str) -> DavFuture<'a, DavStat>;

    /// PROPFIND with depth 1, excluding the collection itself.
    fn list<'a>(&'a self, path: &'a str) -> DavFuture<'a, Vec<DavStat>>;

    /// GET, returning the raw body.
    fn get_contents<'a>(&'a self, path: &'a str) -> DavFuture<'a, Bytes>;

    /// PUT.
    fn put_contents<'a>(
        &'a self,
        path: &'a str,
        data: Bytes,
        options: PutOptions,
    ) -> DavFuture<'a, ()>;

    /// Whether a resource exists at `path`.
    fn exists<'a>(&'a self, path: &'a str) -> DavFuture<'a, bool>;

    /// MOVE.
    fn move_to<'a>(&'a self, from: &'a str, to: &'a str, overwrite: bool) -> DavFuture<'a, ()>;

    /// COPY with depth infinity.
    fn copy_to<'a>(&'a self, from: &'a str, to: &'a str, overwrite: bool) -> DavFuture<'a, ()>;

    /// DELETE; collections are removed recursively.
    fn delete<'a>(&'a self, path: &'a str) -> DavFuture<'a, ()>;

    /// MKCOL. With `recursive` every missing ancestor is created first.
    fn mkdir<'a>(&'a self, path: &'a str, recursive: bool) -> DavFuture<'a, ()>;

    /// Exclusive write LOCK.
    fn lock<'a>(&'a self, path: &'a str) -> DavFuture<'a, LockToken>;

    /// UNLOCK.
    fn unlock<'a>(&'a self, path: &'a str, token: &'a LockToken) -> DavFuture<'a, ()>;
}

/// Constructs clients bound to an origin (`scheme://host[:port]`).
pub trait ClientFactory: Send + Sync {
    fn create<'a>(
        &'a self,
        origin: &'a str,
        options: &'a ClientOptions,
    ) -> DavFuture<'a, Arc<dyn DavClient>>;
}
