//! # davfs
//!
//! Virtual filesystem adapter for WebDAV remotes.
//!
//! This crate provides:
//! - Endpoint resolution from `webdav://` URIs ([`Resolver`])
//! - A pool holding one authenticated client per endpoint ([`ClientPool`])
//! - The filesystem contract (stat, list, read, write, rename, copy,
//!   delete, mkdir, watch) over those clients ([`WebDavFs`])
//!
//! ## URI format
//!
//! ```text
//! webdav://[user:password@]host[:port][/path][?ssl=0|1][&authtype=basic|digest]
//! ```
//!
//! - `ssl` or `ssl=1` selects HTTPS, `ssl=0` plain HTTP. Without the
//!   parameter the transport follows [`DavFsConfig::default_tls`].
//! - `authtype` is `basic` (`b`, empty) or `digest` (`d`). Credentials come
//!   from the user-info component.
//!
//! ## Example
//!
//! ```ignore
//! use davfs::{CopyOptions, FileSystemProvider, WebDavFs};
//! use std::sync::Arc;
//!
//! let fs = WebDavFs::new(Arc::new(my_client_factory));
//! for entry in fs.read_directory("webdav://alice:pw@dav.example/docs").await? {
//!     println!("{} ({:?})", entry.name, entry.kind);
//! }
//! fs.copy(
//!     "webdav://alice:pw@dav.example/docs/a.txt",
//!     "webdav://alice:pw@dav.example/docs/b.txt",
//!     CopyOptions { overwrite: false },
//! )
//! .await?;
//! ```
//!
//! The WebDAV transport itself is supplied by the embedder through
//! [`davfs_proto::ClientFactory`]; [`davfs_proto::memory`] offers an
//! in-memory implementation.

mod config;
mod endpoint;
mod error;
mod pool;
mod provider;

pub use config::DavFsConfig;
pub use endpoint::{Endpoint, EndpointKey, Resolver};
pub use error::{ConfigError, Error, Result};
pub use pool::ClientPool;
pub use provider::{
    CopyOptions, DirEntry, FileStatus, FileSystemProvider, FileType, FsFuture, WatchHandle,
    WebDavFs, WriteOptions,
};

// Re-export protocol types for convenience
pub use davfs_proto::{AuthType, ClientFactory, ClientOptions, DavClient};
