use chrono::DateTime;
use davfs_proto::{DavStat, ResourceKind};
use log::warn;
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    File,
    Directory,
}

impl From<ResourceKind> for FileType {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::File => FileType::File,
            ResourceKind::Directory => FileType::Directory,
        }
    }
}

/// Metadata returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub kind: FileType,
    pub size: u64,
    pub modified: SystemTime,
    /// WebDAV exposes no creation time; always equal to `modified`.
    pub created: SystemTime,
}

impl FileStatus {
    pub(crate) fn from_dav(stat: &DavStat) -> Self {
        let modified = parse_http_date(&stat.last_modified);
        Self {
            kind: stat.kind.into(),
            size: stat.size,
            modified,
            created: modified,
        }
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileType,
}

impl DirEntry {
    pub(crate) fn from_dav(stat: &DavStat) -> Self {
        Self {
            name: stat.basename.clone(),
            kind: stat.kind.into(),
        }
    }
}

/// Flags for `write_file`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Create the file if it does not exist.
    pub create: bool,
    /// Replace the file if it exists.
    pub overwrite: bool,
}

/// Flags for `rename` and `copy`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Replace the destination if it exists.
    pub overwrite: bool,
}

/// Handle returned by `watch`.
///
/// No server-side subscription exists behind it; disposing is a no-op and no
/// change events are ever delivered. Callers needing live updates poll.
#[derive(Debug)]
#[must_use = "dropping the handle disposes the watch"]
pub struct WatchHandle {
    uri: String,
}

impl WatchHandle {
    pub(crate) fn inert(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn dispose(self) {}
}

fn parse_http_date(value: &str) -> SystemTime {
    match DateTime::parse_from_rfc2822(value.trim()) {
        Ok(time) => SystemTime::from(time),
        Err(err) => {
            warn!("unparsable modification time {:?}: {}", value, err);
            UNIX_EPOCH
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dav_stat(kind: ResourceKind, last_modified: &str) -> DavStat {
        DavStat {
            filename: "/notes.txt".into(),
            basename: "notes.txt".into(),
            kind,
            size: 2,
            last_modified: last_modified.into(),
        }
    }

    #[test]
    fn test_status_from_http_date() {
        let status = FileStatus::from_dav(&dav_stat(
            ResourceKind::File,
            "Thu, 01 Jan 1970 00:01:40 GMT",
        ));
        assert_eq!(status.kind, FileType::File);
        assert_eq!(status.size, 2);
        assert_eq!(status.modified, UNIX_EPOCH + Duration::from_secs(100));
        assert_eq!(status.created, status.modified);
    }

    #[test]
    fn test_unparsable_date_maps_to_epoch() {
        let status = FileStatus::from_dav(&dav_stat(ResourceKind::Directory, "yesterday"));
        assert_eq!(status.kind, FileType::Directory);
        assert_eq!(status.modified, UNIX_EPOCH);
    }

    #[test]
    fn test_dir_entry_uses_basename() {
        let entry = DirEntry::from_dav(&dav_stat(ResourceKind::File, ""));
        assert_eq!(entry.name, "notes.txt");
        assert_eq!(entry.kind, FileType::File);
    }

    #[test]
    fn test_watch_handle_is_inert() {
        let handle = WatchHandle::inert("webdav://dav.example/");
        assert_eq!(handle.uri(), "webdav://dav.example/");
        handle.dispose();
    }
}
