//! In-memory WebDAV remote.
//!
//! [`MemoryDav`] keeps a resource tree in memory and answers the
//! [`DavClient`] operations with the status semantics of RFC 4918:
//! missing parents yield 409, refused overwrites 412, foreign locks 423.
//! Call counters and injectable failures make it usable as a test double
//! for code built on top of the protocol traits.

use crate::client::{ClientFactory, DavClient, DavFuture};
use crate::error::{Error, Result};
use crate::types::{ClientOptions, DavStat, LockToken, PutOptions, ResourceKind};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
enum Node {
    File { data: Bytes, modified: DateTime<Utc> },
    Directory { modified: DateTime<Utc> },
}

impl Node {
    fn kind(&self) -> ResourceKind {
        match self {
            Node::File { .. } => ResourceKind::File,
            Node::Directory { .. } => ResourceKind::Directory,
        }
    }
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<String, Node>,
    locks: HashMap<String, LockToken>,
}

#[derive(Debug, Default)]
struct Faults {
    put: Option<Error>,
    lock: Option<Error>,
    unlock: Option<Error>,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicUsize,
    puts: AtomicUsize,
    locks: AtomicUsize,
    unlocks: AtomicUsize,
}

/// A WebDAV remote held entirely in memory.
///
/// Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MemoryDav {
    inner: Arc<MemoryDavInner>,
}

#[derive(Debug)]
struct MemoryDavInner {
    tree: Mutex<Tree>,
    faults: Mutex<Faults>,
    counters: Counters,
    credentials: Option<(String, String)>,
    next_lock: AtomicU64,
}

impl Default for MemoryDav {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDav {
    /// Create a remote containing only the root collection.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a remote that only accepts clients built with these credentials.
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::build(Some((username.into(), password.into())))
    }

    fn build(credentials: Option<(String, String)>) -> Self {
        let mut tree = Tree::default();
        tree.nodes.insert(
            "/".to_string(),
            Node::Directory {
                modified: Utc::now(),
            },
        );
        Self {
            inner: Arc::new(MemoryDavInner {
                tree: Mutex::new(tree),
                faults: Mutex::new(Faults::default()),
                counters: Counters::default(),
                credentials,
                next_lock: AtomicU64::new(1),
            }),
        }
    }

    /// Seed a file, creating missing ancestors.
    pub fn add_file(&self, path: &str, data: impl Into<Bytes>, modified: DateTime<Utc>) {
        let path = normalize(path);
        let mut tree = self.tree();
        create_ancestors(&mut tree, &path);
        tree.nodes.insert(
            path,
            Node::File {
                data: data.into(),
                modified,
            },
        );
    }

    /// Seed a collection, creating missing ancestors.
    pub fn add_dir(&self, path: &str) {
        let path = normalize(path);
        let mut tree = self.tree();
        create_ancestors(&mut tree, &path);
        tree.nodes.insert(
            path,
            Node::Directory {
                modified: Utc::now(),
            },
        );
    }

    /// Body of the file at `path`, if it is a file.
    pub fn file_contents(&self, path: &str) -> Option<Bytes> {
        match self.tree().nodes.get(&normalize(path)) {
            Some(Node::File { data, .. }) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.tree().nodes.contains_key(&normalize(path))
    }

    pub fn is_dir(&self, path: &str) -> bool {
        matches!(
            self.tree().nodes.get(&normalize(path)),
            Some(Node::Directory { .. })
        )
    }

    pub fn is_locked(&self, path: &str) -> bool {
        self.tree().locks.contains_key(&normalize(path))
    }

    /// Make every following PUT fail with `error` (or succeed again with `None`).
    pub fn fail_puts(&self, error: Option<Error>) {
        self.faults().put = error;
    }

    pub fn fail_locks(&self, error: Option<Error>) {
        self.faults().lock = error;
    }

    pub fn fail_unlocks(&self, error: Option<Error>) {
        self.faults().unlock = error;
    }

    /// Number of protocol operations served so far.
    pub fn request_count(&self) -> usize {
        self.inner.counters.requests.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.inner.counters.puts.load(Ordering::SeqCst)
    }

    pub fn lock_count(&self) -> usize {
        self.inner.counters.locks.load(Ordering::SeqCst)
    }

    pub fn unlock_count(&self) -> usize {
        self.inner.counters.unlocks.load(Ordering::SeqCst)
    }

    fn accepts(&self, options: &ClientOptions) -> bool {
        match &self.inner.credentials {
            None => true,
            Some((user, pass)) => {
                options.username.as_deref() == Some(user.as_str())
                    && options.password.as_deref() == Some(pass.as_str())
            }
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.inner.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.inner
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn request(&self) {
        self.inner.counters.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn do_stat(&self, path: &str) -> Result<DavStat> {
        let path = normalize(path);
        let tree = self.tree();
        let node = tree
            .nodes
            .get(&path)
            .ok_or_else(|| Error::NotFound(path.clone()))?;
        Ok(to_stat(&path, node))
    }

    fn do_list(&self, path: &str) -> Result<Vec<DavStat>> {
        let path = normalize(path);
        let tree = self.tree();
        match tree.nodes.get(&path) {
            None => return Err(Error::NotFound(path)),
            Some(Node::File { .. }) => {
                return Err(Error::Other {
                    status: 405,
                    message: format!("{} is not a collection", path),
                })
            }
            Some(Node::Directory { .. }) => {}
        }
        let entries: Vec<DavStat> = tree
            .nodes
            .iter()
            .filter(|(key, _)| key.as_str() != "/" && parent_of(key) == path)
            .map(|(key, node)| to_stat(key, node))
            .collect();
        debug!("memory list({}): {} entries", path, entries.len());
        Ok(entries)
    }

    fn do_get(&self, path: &str) -> Result<Bytes> {
        let path = normalize(path);
        match self.tree().nodes.get(&path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(Error::Other {
                status: 405,
                message: format!("cannot GET collection {}", path),
            }),
            None => Err(Error::NotFound(path)),
        }
    }

    fn do_put(&self, path: &str, data: Bytes, options: PutOptions) -> Result<()> {
        self.inner.counters.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults().put.clone() {
            return Err(err);
        }
        let path = normalize(path);
        let mut tree = self.tree();
        check_lock(&tree, &path, options.lock.as_ref())?;
        match tree.nodes.get(&path) {
            Some(Node::Directory { .. }) => {
                return Err(Error::Other {
                    status: 405,
                    message: format!("cannot PUT to collection {}", path),
                })
            }
            Some(Node::File { .. }) if !options.overwrite => {
                return Err(Error::PreconditionFailed(path))
            }
            _ => {}
        }
        require_parent(&tree, &path)?;
        tree.nodes.insert(
            path,
            Node::File {
                data,
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn do_transfer(&self, from: &str, to: &str, overwrite: bool, remove_source: bool) -> Result<()> {
        let from = normalize(from);
        let to = normalize(to);
        let mut tree = self.tree();
        if !tree.nodes.contains_key(&from) {
            return Err(Error::NotFound(from));
        }
        if from == "/" || to == "/" || from == to || is_within(&to, &from) {
            return Err(Error::Forbidden(to));
        }
        require_parent(&tree, &to)?;
        if remove_source {
            check_lock(&tree, &from, None)?;
        }
        if tree.nodes.contains_key(&to) {
            if !overwrite {
                return Err(Error::PreconditionFailed(to));
            }
            check_lock(&tree, &to, None)?;
            remove_subtree(&mut tree, &to);
        }

        let moved: Vec<(String, Node)> = tree
            .nodes
            .iter()
            .filter(|(key, _)| is_within(key, &from))
            .map(|(key, node)| (format!("{}{}", to, &key[from.len()..]), node.clone()))
            .collect();
        if remove_source {
            remove_subtree(&mut tree, &from);
        }
        tree.nodes.extend(moved);
        Ok(())
    }

    fn do_delete(&self, path: &str) -> Result<()> {
        let path = normalize(path);
        if path == "/" {
            return Err(Error::Forbidden(path));
        }
        let mut tree = self.tree();
        if !tree.nodes.contains_key(&path) {
            return Err(Error::NotFound(path));
        }
        check_lock(&tree, &path, None)?;
        remove_subtree(&mut tree, &path);
        Ok(())
    }

    fn do_mkdir(&self, path: &str, recursive: bool) -> Result<()> {
        let path = normalize(path);
        let mut tree = self.tree();
        if tree.nodes.contains_key(&path) {
            return Err(Error::Other {
                status: 405,
                message: format!("{} already exists", path),
            });
        }
        if recursive {
            let mut missing = Vec::new();
            let mut current = parent_of(&path);
            loop {
                match tree.nodes.get(&current) {
                    Some(Node::Directory { .. }) => break,
                    Some(Node::File { .. }) => return Err(Error::Conflict(path)),
                    None => {
                        let parent = parent_of(&current);
                        missing.push(current);
                        current = parent;
                    }
                }
            }
            for dir in missing.into_iter().rev() {
                tree.nodes.insert(
                    dir,
                    Node::Directory {
                        modified: Utc::now(),
                    },
                );
            }
        } else {
            require_parent(&tree, &path)?;
        }
        tree.nodes.insert(
            path,
            Node::Directory {
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    fn do_lock(&self, path: &str) -> Result<LockToken> {
        self.inner.counters.locks.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults().lock.clone() {
            return Err(err);
        }
        let path = normalize(path);
        let mut tree = self.tree();
        if tree.locks.contains_key(&path) {
            return Err(Error::Locked(path));
        }
        let id = self.inner.next_lock.fetch_add(1, Ordering::SeqCst);
        let token = LockToken::new(format!("opaquelocktoken:memory-{}", id));
        tree.locks.insert(path, token.clone());
        Ok(token)
    }

    fn do_unlock(&self, path: &str, token: &LockToken) -> Result<()> {
        self.inner.counters.unlocks.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.faults().unlock.clone() {
            return Err(err);
        }
        let path = normalize(path);
        let mut tree = self.tree();
        match tree.locks.get(&path) {
            Some(held) if held == token => {
                tree.locks.remove(&path);
                Ok(())
            }
            Some(_) => Err(Error::Locked(path)),
            None => Err(Error::Other {
                status: 409,
                message: format!("no lock held on {}", path),
            }),
        }
    }
}

impl DavClient for MemoryDav {
    fn stat<'a>(&'a self, path: &'a str) -> DavFuture<'a, DavStat> {
        trace!("memory stat({})", path);
        self.request();
        let result = self.do_stat(path);
        Box::pin(async move { result })
    }

    fn list<'a>(&'a self, path: &'a str) -> DavFuture<'a, Vec<DavStat>> {
        trace!("memory list({})", path);
        self.request();
        let result = self.do_list(path);
        Box::pin(async move { result })
    }

    fn get_contents<'a>(&'a self, path: &'a str) -> DavFuture<'a, Bytes> {
        trace!("memory get({})", path);
        self.request();
        let result = self.do_get(path);
        Box::pin(async move { result })
    }

    fn put_contents<'a>(
        &'a self,
        path: &'a str,
        data: Bytes,
        options: PutOptions,
    ) -> DavFuture<'a, ()> {
        trace!("memory put({}, {} bytes, {:?})", path, data.len(), options);
        self.request();
        let result = self.do_put(path, data, options);
        Box::pin(async move { result })
    }

    fn exists<'a>(&'a self, path: &'a str) -> DavFuture<'a, bool> {
        trace!("memory exists({})", path);
        self.request();
        let result: Result<bool> = Ok(self.tree().nodes.contains_key(&normalize(path)));
        Box::pin(async move { result })
    }

    fn move_to<'a>(&'a self, from: &'a str, to: &'a str, overwrite: bool) -> DavFuture<'a, ()> {
        trace!("memory move({}, {}, overwrite={})", from, to, overwrite);
        self.request();
        let result = self.do_transfer(from, to, overwrite, true);
        Box::pin(async move { result })
    }

    fn copy_to<'a>(&'a self, from: &'a str, to: &'a str, overwrite: bool) -> DavFuture<'a, ()> {
        trace!("memory copy({}, {}, overwrite={})", from, to, overwrite);
        self.request();
        let result = self.do_transfer(from, to, overwrite, false);
        Box::pin(async move { result })
    }

    fn delete<'a>(&'a self, path: &'a str) -> DavFuture<'a, ()> {
        trace!("memory delete({})", path);
        self.request();
        let result = self.do_delete(path);
        Box::pin(async move { result })
    }

    fn mkdir<'a>(&'a self, path: &'a str, recursive: bool) -> DavFuture<'a, ()> {
        trace!("memory mkdir({}, recursive={})", path, recursive);
        self.request();
        let result = self.do_mkdir(path, recursive);
        Box::pin(async move { result })
    }

    fn lock<'a>(&'a self, path: &'a str) -> DavFuture<'a, LockToken> {
        trace!("memory lock({})", path);
        self.request();
        let result = self.do_lock(path);
        Box::pin(async move { result })
    }

    fn unlock<'a>(&'a self, path: &'a str, token: &'a LockToken) -> DavFuture<'a, ()> {
        trace!("memory unlock({}, {})", path, token);
        self.request();
        let result = self.do_unlock(path, token);
        Box::pin(async move { result })
    }
}

/// [`ClientFactory`] handing out [`MemoryDav`] remotes keyed by origin.
///
/// Unknown origins get a fresh empty remote on first use.
#[derive(Debug, Default)]
pub struct MemoryFactory {
    remotes: Mutex<HashMap<String, MemoryDav>>,
    created: AtomicUsize,
    requested: Mutex<Vec<(String, ClientOptions)>>,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `remote` as the server behind `origin`.
    pub fn with_remote(self, origin: impl Into<String>, remote: MemoryDav) -> Self {
        self.remotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(origin.into(), remote);
        self
    }

    /// The remote behind `origin`, created empty if unknown.
    pub fn remote(&self, origin: &str) -> MemoryDav {
        self.remotes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(origin.to_string())
            .or_default()
            .clone()
    }

    /// Number of clients constructed so far.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Every `(origin, options)` pair a client was requested with, in order.
    pub fn requests(&self) -> Vec<(String, ClientOptions)> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ClientFactory for MemoryFactory {
    fn create<'a>(
        &'a self,
        origin: &'a str,
        options: &'a ClientOptions,
    ) -> DavFuture<'a, Arc<dyn DavClient>> {
        self.requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((origin.to_string(), options.clone()));
        let remote = self.remote(origin);
        let result = if remote.accepts(options) {
            self.created.fetch_add(1, Ordering::SeqCst);
            debug!("memory client created for {}", origin);
            Ok(Arc::new(remote) as Arc<dyn DavClient>)
        } else {
            Err(Error::Unauthorized)
        };
        Box::pin(async move { result })
    }
}

/// Render a timestamp as an HTTP-date, the format of `getlastmodified`.
pub fn http_date(time: &DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn to_stat(path: &str, node: &Node) -> DavStat {
    let (size, modified) = match node {
        Node::File { data, modified } => (data.len() as u64, modified),
        Node::Directory { modified } => (0, modified),
    };
    DavStat {
        filename: path.to_string(),
        basename: basename_of(path).to_string(),
        kind: node.kind(),
        size,
        last_modified: http_date(modified),
    }
}

fn check_lock(tree: &Tree, path: &str, token: Option<&LockToken>) -> Result<()> {
    match tree.locks.get(path) {
        Some(held) if Some(held) != token => Err(Error::Locked(path.to_string())),
        _ => Ok(()),
    }
}

fn require_parent(tree: &Tree, path: &str) -> Result<()> {
    match tree.nodes.get(&parent_of(path)) {
        Some(Node::Directory { .. }) => Ok(()),
        _ => Err(Error::Conflict(path.to_string())),
    }
}

fn create_ancestors(tree: &mut Tree, path: &str) {
    let mut current = parent_of(path);
    while !tree.nodes.contains_key(&current) {
        tree.nodes.insert(
            current.clone(),
            Node::Directory {
                modified: Utc::now(),
            },
        );
        current = parent_of(&current);
    }
}

fn remove_subtree(tree: &mut Tree, path: &str) {
    tree.nodes.retain(|key, _| !is_within(key, path));
    tree.locks.retain(|key, _| !is_within(key, path));
}

/// Whether `path` is `root` or lies below it.
fn is_within(path: &str, root: &str) -> bool {
    if root == "/" {
        return true;
    }
    path == root
        || (path.starts_with(root) && path.as_bytes().get(root.len()) == Some(&b'/'))
}

fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some(("", _)) | None => "/".to_string(),
        Some((parent, _)) => parent.to_string(),
    }
}

fn basename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
