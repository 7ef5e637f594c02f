//! In-memory backend, built once and shared read-only

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use std::collections::BTreeMap;

use super::{base_name, relative, ChildEntry, FileSystem, FsError, Resource, ResourceInfo};

#[derive(Debug, Clone)]
enum Node {
    File {
        data: Bytes,
        modified: Option<DateTime<Utc>>,
    },
    Dir {
        modified: Option<DateTime<Utc>>,
    },
}

/// Immutable file tree held in memory
///
/// ```
/// use rust_fileserver::fs::MemoryFs;
///
/// let fs = MemoryFs::builder()
///     .file("/docs/readme.txt", "hello")
///     .dir("/empty")
///     .build();
/// # let _ = fs;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    nodes: BTreeMap<String, Node>,
}

impl MemoryFs {
    pub fn builder() -> MemoryFsBuilder {
        MemoryFsBuilder::default()
    }

    fn children(&self, rel: &str) -> Vec<ChildEntry> {
        let prefix = if rel.is_empty() {
            String::new()
        } else {
            format!("{rel}/")
        };
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !path.is_empty() && !path[prefix.len()..].contains('/'))
            .map(|(path, node)| ChildEntry {
                name: path[prefix.len()..].to_string(),
                is_dir: matches!(node, Node::Dir { .. }),
            })
            .collect()
    }
}

/// Builder for [`MemoryFs`]; parent directories are created implicitly.
#[derive(Debug, Default)]
pub struct MemoryFsBuilder {
    nodes: BTreeMap<String, Node>,
    modified: Option<DateTime<Utc>>,
}

impl MemoryFsBuilder {
    /// Modification time stamped on entries added after this call
    pub fn modified(mut self, at: DateTime<Utc>) -> Self {
        self.modified = Some(at);
        self
    }

    pub fn file(mut self, path: &str, data: impl Into<Bytes>) -> Self {
        let rel = relative(path).to_string();
        self.add_parents(&rel);
        self.nodes.insert(
            rel,
            Node::File {
                data: data.into(),
                modified: self.modified,
            },
        );
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        let rel = relative(path).to_string();
        self.add_parents(&rel);
        self.nodes.entry(rel).or_insert(Node::Dir {
            modified: self.modified,
        });
        self
    }

    pub fn build(mut self) -> MemoryFs {
        self.nodes.entry(String::new()).or_insert(Node::Dir {
            modified: self.modified,
        });
        MemoryFs { nodes: self.nodes }
    }

    fn add_parents(&mut self, rel: &str) {
        let mut end = 0;
        while let Some(pos) = rel[end..].find('/') {
            end += pos;
            self.nodes
                .entry(rel[..end].to_string())
                .or_insert(Node::Dir {
                    modified: self.modified,
                });
            end += 1;
        }
    }
}

struct MemoryEntry {
    info: ResourceInfo,
    data: Option<Bytes>,
    children: Vec<ChildEntry>,
}

#[async_trait]
impl Resource for MemoryEntry {
    fn stat(&self) -> Result<ResourceInfo, FsError> {
        Ok(self.info.clone())
    }

    async fn read_dir(&self) -> Result<Vec<ChildEntry>, FsError> {
        if !self.info.is_dir {
            return Err(FsError::Other(std::io::Error::other("not a directory")));
        }
        Ok(self.children.clone())
    }

    async fn read(&self) -> Result<Bytes, FsError> {
        self.data
            .clone()
            .ok_or_else(|| FsError::Other(std::io::Error::other("is a directory")))
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn open(&self, path: &str) -> Result<Box<dyn Resource>, FsError> {
        let rel = relative(path);
        let node = self.nodes.get(rel).ok_or(FsError::NotFound)?;

        let entry = match node {
            Node::File { data, modified } => MemoryEntry {
                info: ResourceInfo {
                    name: base_name(rel),
                    is_dir: false,
                    modified: *modified,
                },
                data: Some(data.clone()),
                children: Vec::new(),
            },
            Node::Dir { modified } => MemoryEntry {
                info: ResourceInfo {
                    name: base_name(rel),
                    is_dir: true,
                    modified: *modified,
                },
                data: None,
                children: self.children(rel),
            },
        };
        Ok(Box::new(entry))
    }
}
