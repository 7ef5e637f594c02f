//! Compiled-in asset backend
//!
//! Serves the `static/` tree embedded with rust-embed. Directories are not
//! stored, they are implied by the file paths beneath them and carry no
//! modification time.

use async_trait::async_trait;
use chrono::DateTime;
use hyper::body::Bytes;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use super::{base_name, relative, ChildEntry, FileSystem, FsError, Resource, ResourceInfo};

/// Site content shipped inside the binary
#[derive(RustEmbed)]
#[folder = "static/"]
pub struct StaticAssets;

/// Filesystem view over a rust-embed asset bundle
pub struct EmbeddedFs<E: RustEmbed = StaticAssets> {
    files: BTreeSet<String>,
    _assets: PhantomData<fn() -> E>,
}

impl<E: RustEmbed> EmbeddedFs<E> {
    /// Index the bundle once; the set of files never changes afterwards.
    pub fn new() -> Self {
        Self {
            files: E::iter().map(Cow::into_owned).collect(),
            _assets: PhantomData,
        }
    }

    fn is_dir(&self, rel: &str) -> bool {
        if rel.is_empty() {
            return true;
        }
        let prefix = format!("{rel}/");
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|f| f.starts_with(&prefix))
    }

    fn children(&self, rel: &str) -> Vec<ChildEntry> {
        let prefix = if rel.is_empty() {
            String::new()
        } else {
            format!("{rel}/")
        };

        let mut children = BTreeMap::new();
        for file in self.files.range(prefix.clone()..) {
            let Some(rest) = file.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once('/') {
                Some((dir, _)) => children.insert(dir.to_string(), true),
                None => children.insert(rest.to_string(), false),
            };
        }
        children
            .into_iter()
            .map(|(name, is_dir)| ChildEntry { name, is_dir })
            .collect()
    }
}

impl<E: RustEmbed> Default for EmbeddedFs<E> {
    fn default() -> Self {
        Self::new()
    }
}

enum EmbeddedEntry {
    File { info: ResourceInfo, data: Bytes },
    Dir { info: ResourceInfo, children: Vec<ChildEntry> },
}

#[async_trait]
impl Resource for EmbeddedEntry {
    fn stat(&self) -> Result<ResourceInfo, FsError> {
        match self {
            Self::File { info, .. } | Self::Dir { info, .. } => Ok(info.clone()),
        }
    }

    async fn read_dir(&self) -> Result<Vec<ChildEntry>, FsError> {
        match self {
            Self::Dir { children, .. } => Ok(children.clone()),
            Self::File { .. } => Err(FsError::Other(std::io::Error::other("not a directory"))),
        }
    }

    async fn read(&self) -> Result<Bytes, FsError> {
        match self {
            Self::File { data, .. } => Ok(data.clone()),
            Self::Dir { .. } => Err(FsError::Other(std::io::Error::other("is a directory"))),
        }
    }
}

#[async_trait]
impl<E: RustEmbed + 'static> FileSystem for EmbeddedFs<E> {
    async fn open(&self, path: &str) -> Result<Box<dyn Resource>, FsError> {
        let rel = relative(path);

        if self.files.contains(rel) {
            let file = E::get(rel).ok_or(FsError::NotFound)?;
            let modified = file
                .metadata
                .last_modified()
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
            let data = match file.data {
                Cow::Borrowed(bytes) => Bytes::from_static(bytes),
                Cow::Owned(bytes) => Bytes::from(bytes),
            };
            return Ok(Box::new(EmbeddedEntry::File {
                info: ResourceInfo {
                    name: base_name(rel),
                    is_dir: false,
                    modified,
                },
                data,
            }));
        }

        if self.is_dir(rel) {
            return Ok(Box::new(EmbeddedEntry::Dir {
                info: ResourceInfo {
                    name: base_name(rel),
                    is_dir: true,
                    modified: None,
                },
                children: self.children(rel),
            }));
        }

        Err(FsError::NotFound)
    }
}
