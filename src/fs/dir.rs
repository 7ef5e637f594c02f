//! On-disk directory backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};

use super::{base_name, relative, ChildEntry, FileSystem, FsError, Resource, ResourceInfo};
use crate::logger;

/// Serves files below a root directory. Symlinks that resolve outside the
/// root are refused with `PermissionDenied`.
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("content root {} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }
}

struct DirEntryHandle {
    path: PathBuf,
    info: ResourceInfo,
}

#[async_trait]
impl Resource for DirEntryHandle {
    fn stat(&self) -> Result<ResourceInfo, FsError> {
        Ok(self.info.clone())
    }

    async fn read_dir(&self) -> Result<Vec<ChildEntry>, FsError> {
        let mut reader = tokio::fs::read_dir(&self.path).await?;
        let mut children = Vec::new();
        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            let is_dir = if file_type.is_symlink() {
                // dangling links show up as files
                tokio::fs::metadata(entry.path())
                    .await
                    .is_ok_and(|m| m.is_dir())
            } else {
                file_type.is_dir()
            };
            children.push(ChildEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }
        Ok(children)
    }

    async fn read(&self) -> Result<Bytes, FsError> {
        Ok(Bytes::from(tokio::fs::read(&self.path).await?))
    }
}

#[async_trait]
impl FileSystem for DirFs {
    async fn open(&self, path: &str) -> Result<Box<dyn Resource>, FsError> {
        let rel = relative(path);
        if rel.split('/').any(|segment| segment == "..") {
            return Err(FsError::NotFound);
        }

        let resolved = tokio::fs::canonicalize(self.root.join(rel)).await?;
        if !resolved.starts_with(&self.root) {
            logger::log_warning(&format!(
                "Refusing {path}: resolves outside content root to {}",
                resolved.display()
            ));
            return Err(FsError::PermissionDenied);
        }

        let metadata = tokio::fs::metadata(&resolved).await?;
        let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

        Ok(Box::new(DirEntryHandle {
            path: resolved,
            info: ResourceInfo {
                name: base_name(rel),
                is_dir: metadata.is_dir(),
                modified,
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("index.html"), "<p>sub</p>").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_open_file_and_read() {
        let dir = fixture();
        let fs = DirFs::new(dir.path()).unwrap();

        let file = fs.open("/hello.txt").await.unwrap();
        let info = file.stat().unwrap();
        assert_eq!(info.name, "hello.txt");
        assert!(!info.is_dir);
        assert!(info.modified.is_some());
        assert_eq!(file.read().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_read_dir() {
        let dir = fixture();
        let fs = DirFs::new(dir.path()).unwrap();

        let root = fs.open("/").await.unwrap();
        assert!(root.stat().unwrap().is_dir);
        let mut children = root.read_dir().await.unwrap();
        children.sort();
        assert_eq!(
            children,
            vec![ChildEntry::file("hello.txt"), ChildEntry::dir("sub")]
        );
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let dir = fixture();
        let fs = DirFs::new(dir.path()).unwrap();
        assert!(matches!(
            fs.open("/nope.txt").await.err(),
            Some(FsError::NotFound)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_denied() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let dir = fixture();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link"))
            .unwrap();

        let fs = DirFs::new(dir.path()).unwrap();
        assert!(matches!(
            fs.open("/link").await.err(),
            Some(FsError::PermissionDenied)
        ));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = fixture();
        assert!(DirFs::new(dir.path().join("hello.txt")).is_err());
    }
}
