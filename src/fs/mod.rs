//! Virtual filesystem module
//!
//! A read-only, `/`-separated file hierarchy the request handler resolves
//! paths against. Backends:
//! - `EmbeddedFs`: assets compiled into the binary
//! - `DirFs`: a directory on disk
//! - `MemoryFs`: an immutable in-memory tree

mod dir;
mod embedded;
mod memory;

pub use dir::DirFs;
pub use embedded::{EmbeddedFs, StaticAssets};
pub use memory::{MemoryFs, MemoryFsBuilder};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ContentConfig, ContentSource};

/// Filesystem failure, classified the way the handler reports it
#[derive(Debug, Error)]
pub enum FsError {
    #[error("file does not exist")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error(transparent)]
    Other(io::Error),
}

impl From<io::Error> for FsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Other(err),
        }
    }
}

/// Metadata of an open entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Last path element (`/` for the root)
    pub name: String,
    pub is_dir: bool,
    /// `None` when the backend has no modification time
    pub modified: Option<DateTime<Utc>>,
}

/// One child of a directory, as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChildEntry {
    pub name: String,
    pub is_dir: bool,
}

impl ChildEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Handle to an open entry. Dropping the handle releases it.
#[async_trait]
pub trait Resource: Send + Sync {
    fn stat(&self) -> Result<ResourceInfo, FsError>;

    /// Enumerate the children of a directory, in backend order
    async fn read_dir(&self) -> Result<Vec<ChildEntry>, FsError>;

    /// Read the whole content of a file
    async fn read(&self) -> Result<Bytes, FsError>;
}

/// A read-only file hierarchy, safe for concurrent use
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Open a cleaned, rooted path such as `/docs/index.html`.
    async fn open(&self, path: &str) -> Result<Box<dyn Resource>, FsError>;
}

/// Build the filesystem backend selected by configuration
pub fn from_config(config: &ContentConfig) -> io::Result<Arc<dyn FileSystem>> {
    match config.source {
        ContentSource::Embedded => Ok(Arc::new(EmbeddedFs::<StaticAssets>::new())),
        ContentSource::Directory => Ok(Arc::new(DirFs::new(&config.root)?)),
    }
}

/// Split a rooted path into its relative form (`/a/b` → `a/b`, `/` → ``)
fn relative(path: &str) -> &str {
    path.trim_start_matches('/').trim_end_matches('/')
}

/// Last element of a relative path, `/` for the root
fn base_name(rel: &str) -> String {
    match rel.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_classification() {
        let err = FsError::from(io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, FsError::NotFound));
        let err = FsError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, FsError::PermissionDenied));
        let err = FsError::from(io::Error::other("disk on fire"));
        assert!(matches!(err, FsError::Other(_)));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(relative("/"), "");
        assert_eq!(relative("/a/b"), "a/b");
        assert_eq!(base_name(""), "/");
        assert_eq!(base_name("a/b.txt"), "b.txt");
        assert_eq!(base_name("a"), "a");
    }
}
