//! # davfs-proto
//!
//! WebDAV protocol surface consumed by the `davfs` filesystem adapter.
//!
//! This crate provides:
//! - [`DavClient`]: the operations a WebDAV client offers against one origin
//!   (PROPFIND, GET, PUT, MKCOL, MOVE, COPY, DELETE, LOCK/UNLOCK)
//! - [`ClientFactory`]: construction of clients from an origin and
//!   [`ClientOptions`] (auth scheme and credentials)
//! - [`Error`]: protocol failures as explicit variants, with a distinguished
//!   [`Error::NotFound`]
//! - [`memory`]: an in-memory remote implementing both traits
//!
//! ## Example
//!
//! ```ignore
//! use davfs_proto::memory::MemoryDav;
//! use davfs_proto::{DavClient, PutOptions};
//!
//! let remote = MemoryDav::new();
//! remote.put_contents("/notes.txt", "hi".into(), PutOptions::default()).await?;
//! let stat = remote.stat("/notes.txt").await?;
//! assert_eq!(stat.size, 2);
//! ```

mod client;
mod error;
pub mod memory;
mod types;

pub use client::{ClientFactory, DavClient, DavFuture};
pub use error::{Error, Result};
pub use types::{AuthType, ClientOptions, DavStat, LockToken, PutOptions, ResourceKind};
