//! [`FileSystemProvider`] implementation backed by pooled WebDAV clients.

use super::types::{CopyOptions, DirEntry, FileStatus, WatchHandle, WriteOptions};
use super::{FileSystemProvider, FsFuture};
use crate::config::DavFsConfig;
use crate::endpoint::{Endpoint, Resolver};
use crate::error::{Error, Result};
use crate::pool::ClientPool;
use bytes::Bytes;
use davfs_proto::{ClientFactory, DavClient, PutOptions};
use log::{debug, trace, warn};
use std::sync::Arc;

/// WebDAV-backed filesystem.
///
/// Cheap to clone; clones share the resolver and the client pool.
#[derive(Clone)]
pub struct WebDavFs {
    inner: Arc<WebDavFsInner>,
}

struct WebDavFsInner {
    resolver: Resolver,
    pool: ClientPool,
}

#[derive(Debug, Clone, Copy)]
enum Transfer {
    Move,
    Copy,
}

impl Transfer {
    fn verb(self) -> &'static str {
        match self {
            Transfer::Move => "move",
            Transfer::Copy => "copy",
        }
    }
}

impl WebDavFs {
    /// Create a filesystem with the default configuration.
    pub fn new(factory: Arc<dyn ClientFactory>) -> Self {
        Self::with_config(factory, &DavFsConfig::default())
    }

    pub fn with_config(factory: Arc<dyn ClientFactory>, config: &DavFsConfig) -> Self {
        Self {
            inner: Arc::new(WebDavFsInner {
                resolver: Resolver::new(config),
                pool: ClientPool::new(factory),
            }),
        }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.inner.resolver
    }

    pub fn pool(&self) -> &ClientPool {
        &self.inner.pool
    }

    /// Drop every pooled client, for hosts with a shutdown hook.
    pub fn close_all(&self) -> usize {
        self.inner.pool.close_all()
    }

    async fn client_for(&self, endpoint: &Endpoint) -> Result<Arc<dyn DavClient>> {
        self.inner
            .pool
            .get_or_create(&endpoint.key, &endpoint.origin, &endpoint.options)
            .await
            .map_err(|e| Error::from_protocol(endpoint.display_uri(), e))
    }

    async fn connect(&self, uri: &str) -> Result<(Endpoint, Arc<dyn DavClient>)> {
        let endpoint = self.inner.resolver.resolve(uri)?;
        let client = self.client_for(&endpoint).await?;
        Ok((endpoint, client))
    }

    async fn stat_impl(&self, uri: &str) -> Result<FileStatus> {
        let (endpoint, client) = self.connect(uri).await?;
        let stat = client
            .stat(&endpoint.path)
            .await
            .map_err(|e| Error::from_protocol(endpoint.display_uri(), e))?;
        Ok(FileStatus::from_dav(&stat))
    }

    async fn read_directory_impl(&self, uri: &str) -> Result<Vec<DirEntry>> {
        let (endpoint, client) = self.connect(uri).await?;
        let children = client
            .list(&endpoint.path)
            .await
            .map_err(|e| Error::from_protocol(endpoint.display_uri(), e))?;
        debug!(
            "read_directory({}): {} entries",
            endpoint.display_uri(),
            children.len()
        );
        Ok(children.iter().map(DirEntry::from_dav).collect())
    }

    async fn read_file_impl(&self, uri: &str) -> Result<Bytes> {
        let (endpoint, client) = self.connect(uri).await?;
        client
            .get_contents(&endpoint.path)
            .await
            .map_err(|e| Error::from_protocol(endpoint.display_uri(), e))
    }

    async fn write_file_impl(&self, uri: &str, content: Bytes, options: WriteOptions) -> Result<()> {
        let (endpoint, client) = self.connect(uri).await?;
        let path = endpoint.path.as_str();
        let display = endpoint.display_uri();
        let fail = |e| Error::from_protocol(display, e);

        let exists = client.exists(path).await.map_err(fail)?;
        if !exists && !options.create {
            return Err(Error::FileNotFound(display.to_string()));
        }
        if exists && options.create && !options.overwrite {
            return Err(Error::FileExists(display.to_string()));
        }
        if exists && client.stat(path).await.map_err(fail)?.kind.is_dir() {
            return Err(Error::FileIsADirectory(display.to_string()));
        }

        let token = client.lock(path).await.map_err(|source| Error::Lock {
            path: display.to_string(),
            source,
        })?;
        let put_options = PutOptions {
            overwrite: true,
            lock: Some(token.clone()),
        };
        let written = client.put_contents(path, content, put_options).await;
        if let Err(err) = client.unlock(path, &token).await {
            warn!("failed to release lock on {}: {}", display, err);
        }
        written.map_err(fail)
    }

    async fn transfer(
        &self,
        transfer: Transfer,
        old_uri: &str,
        new_uri: &str,
        options: CopyOptions,
    ) -> Result<()> {
        let from = self.inner.resolver.resolve(old_uri)?;
        let to = self.inner.resolver.resolve(new_uri)?;
        if from.key != to.key {
            return Err(Error::NoPermissions(format!(
                "cannot {} {} to another endpoint ({})",
                transfer.verb(),
                from.display_uri(),
                to.display_uri()
            )));
        }

        let client = self.client_for(&from).await?;
        if !options.overwrite {
            let taken = client
                .exists(&to.path)
                .await
                .map_err(|e| Error::from_protocol(to.display_uri(), e))?;
            if taken {
                return Err(Error::FileExists(to.display_uri().to_string()));
            }
        }

        let result = match transfer {
            Transfer::Move => client.move_to(&from.path, &to.path, options.overwrite).await,
            Transfer::Copy => client.copy_to(&from.path, &to.path, options.overwrite).await,
        };
        result.map_err(|e| Error::from_protocol(from.display_uri(), e))
    }

    async fn delete_impl(&self, uri: &str) -> Result<()> {
        let (endpoint, client) = self.connect(uri).await?;
        client
            .delete(&endpoint.path)
            .await
            .map_err(|e| Error::from_protocol(endpoint.display_uri(), e))
    }

    async fn create_directory_impl(&self, uri: &str) -> Result<()> {
        let (endpoint, client) = self.connect(uri).await?;
        let fail = |e| Error::from_protocol(endpoint.display_uri(), e);
        if client.exists(&endpoint.path).await.map_err(fail)? {
            return Err(Error::FileExists(endpoint.display_uri().to_string()));
        }
        client.mkdir(&endpoint.path, true).await.map_err(fail)
    }
}

impl FileSystemProvider for WebDavFs {
    fn stat<'a>(&'a self, uri: &'a str) -> FsFuture<'a, FileStatus> {
        trace!("stat({})", uri);
        Box::pin(self.stat_impl(uri))
    }

    fn read_directory<'a>(&'a self, uri: &'a str) -> FsFuture<'a, Vec<DirEntry>> {
        trace!("read_directory({})", uri);
        Box::pin(self.read_directory_impl(uri))
    }

    fn read_file<'a>(&'a self, uri: &'a str) -> FsFuture<'a, Bytes> {
        trace!("read_file({})", uri);
        Box::pin(self.read_file_impl(uri))
    }

    fn write_file<'a>(
        &'a self,
        uri: &'a str,
        content: Bytes,
        options: WriteOptions,
    ) -> FsFuture<'a, ()> {
        trace!("write_file({}, {} bytes, {:?})", uri, content.len(), options);
        Box::pin(self.write_file_impl(uri, content, options))
    }

    fn rename<'a>(
        &'a self,
        old_uri: &'a str,
        new_uri: &'a str,
        options: CopyOptions,
    ) -> FsFuture<'a, ()> {
        trace!("rename({}, {}, {:?})", old_uri, new_uri, options);
        Box::pin(self.transfer(Transfer::Move, old_uri, new_uri, options))
    }

    fn copy<'a>(
        &'a self,
        old_uri: &'a str,
        new_uri: &'a str,
        options: CopyOptions,
    ) -> FsFuture<'a, ()> {
        trace!("copy({}, {}, {:?})", old_uri, new_uri, options);
        Box::pin(self.transfer(Transfer::Copy, old_uri, new_uri, options))
    }

    fn delete<'a>(&'a self, uri: &'a str) -> FsFuture<'a, ()> {
        trace!("delete({})", uri);
        Box::pin(self.delete_impl(uri))
    }

    fn create_directory<'a>(&'a self, uri: &'a str) -> FsFuture<'a, ()> {
        trace!("create_directory({})", uri);
        Box::pin(self.create_directory_impl(uri))
    }

    fn watch(&self, uri: &str) -> WatchHandle {
        trace!("watch({})", uri);
        WatchHandle::inert(uri)
    }
}
