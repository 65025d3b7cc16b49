//! Uniform filesystem contract over WebDAV remotes.
//!
//! [`FileSystemProvider`] is the operation set a generic file-oriented
//! caller (editor, sync tool, archiver) drives. [`WebDavFs`] implements it
//! by resolving each URI to a pooled protocol client and translating the
//! protocol's responses into filesystem results.
//!
//! # Example
//!
//! ```ignore
//! use davfs::{FileSystemProvider, WebDavFs, WriteOptions};
//! use davfs_proto::memory::MemoryFactory;
//! use std::sync::Arc;
//!
//! let fs = WebDavFs::new(Arc::new(MemoryFactory::new()));
//! fs.write_file(
//!     "webdav://dav.example/notes.txt",
//!     "hi".into(),
//!     WriteOptions { create: true, overwrite: false },
//! )
//! .await?;
//! let status = fs.stat("webdav://dav.example/notes.txt").await?;
//! assert_eq!(status.size, 2);
//! ```

mod filesystem;
mod types;

use crate::error::Result;
use bytes::Bytes;
use futures::future::BoxFuture;

pub use filesystem::WebDavFs;
pub use types::{CopyOptions, DirEntry, FileStatus, FileType, WatchHandle, WriteOptions};

/// Boxed future returned by filesystem operations.
pub type FsFuture<'a, T> = BoxFuture<'a, Result<T>>;

/// Filesystem operations addressed by URI.
pub trait FileSystemProvider: Send + Sync {
    /// Metadata of the file or directory at `uri`.
    fn stat<'a>(&'a self, uri: &'a str) -> FsFuture<'a, FileStatus>;

    /// Immediate children of the directory at `uri`, in server order.
    fn read_directory<'a>(&'a self, uri: &'a str) -> FsFuture<'a, Vec<DirEntry>>;

    fn read_file<'a>(&'a self, uri: &'a str) -> FsFuture<'a, Bytes>;

    /// Write `content` to `uri` under an exclusive lock.
    fn write_file<'a>(
        &'a self,
        uri: &'a str,
        content: Bytes,
        options: WriteOptions,
    ) -> FsFuture<'a, ()>;

    /// Move within one endpoint.
    fn rename<'a>(
        &'a self,
        old_uri: &'a str,
        new_uri: &'a str,
        options: CopyOptions,
    ) -> FsFuture<'a, ()>;

    /// Copy within one endpoint.
    fn copy<'a>(
        &'a self,
        old_uri: &'a str,
        new_uri: &'a str,
        options: CopyOptions,
    ) -> FsFuture<'a, ()>;

    /// Delete a file, or a directory with everything below it.
    fn delete<'a>(&'a self, uri: &'a str) -> FsFuture<'a, ()>;

    /// Create a directory along with any missing ancestors.
    fn create_directory<'a>(&'a self, uri: &'a str) -> FsFuture<'a, ()>;

    fn watch(&self, uri: &str) -> WatchHandle;
}
