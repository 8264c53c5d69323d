//! Content discovery. A [`ContentSource`] knows which content items exist and how to read the
//! metadata block of each one; everything downstream only sees [`RawMetadata`].

use std::{
    fmt::{Display, Formatter},
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;
use tokio::fs::{read_dir, read_to_string};
use tracing::debug;

use crate::error::{BarErr, ContextExt};

const FENCE: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    /// A single content file such as `hello.md`.
    File,
    /// A directory holding an `index.md`.
    Bundle,
}

/// Name of a content item inside its source, together with how it is laid out on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId {
    pub name: Arc<str>,
    pub kind: ItemKind,
}

impl ItemId {
    pub fn bundle(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            kind: ItemKind::Bundle,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn is_bundle(&self) -> bool {
        self.kind == ItemKind::Bundle
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self {
            name: Arc::from(value),
            kind: ItemKind::File,
        }
    }
}

/// Metadata block as authored. Required fields are optional here so a missing field is
/// reported by validation with the item name instead of a bare YAML error.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "description")]
    pub desc: String,
    #[serde(default, alias = "imageURL", alias = "image")]
    pub image_url: Option<String>,
}

pub trait ContentSource: Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<ItemId>, BarErr>> + Send;
    fn load(&self, id: &ItemId) -> impl Future<Output = Result<RawMetadata, BarErr>> + Send;
}

/// Reads content items from a directory on disk.
pub struct FsSource {
    root: PathBuf,
    extension: Arc<str>,
}

impl FsSource {
    pub fn new(root: PathBuf, extension: Arc<str>) -> Self {
        Self { root, extension }
    }

    fn entry_file_name(&self) -> String {
        format!("index.{}", self.extension)
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension.as_ref())
    }

    fn entry_path(&self, id: &ItemId) -> PathBuf {
        let path = self.root.join(id.as_str());
        match id.kind {
            ItemKind::File => path,
            ItemKind::Bundle => path.join(self.entry_file_name()),
        }
    }
}

impl ContentSource for FsSource {
    async fn list(&self) -> Result<Vec<ItemId>, BarErr> {
        let mut ids = Vec::new();
        let mut entries = read_dir(&self.root)
            .await
            .with_context(|| format!("content directory: {}", self.root.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("skip entry with non UTF-8 name: {}", path.display());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                if tokio::fs::try_exists(path.join(self.entry_file_name())).await? {
                    ids.push(ItemId::bundle(&name));
                } else {
                    debug!("skip directory without entry file: {}", path.display());
                }
            } else if self.is_content_file(&path) {
                ids.push(ItemId::from(name.as_str()));
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn load(&self, id: &ItemId) -> Result<RawMetadata, BarErr> {
        let path = self.entry_path(id);
        let contents = read_to_string(&path)
            .await
            .map_err(|e| BarErr::extraction(id.as_str(), format!("{}: {e}", path.display())))?;
        parse_front_matter(&contents.replace("\r\n", "\n"))
            .map_err(|reason| BarErr::extraction(id.as_str(), reason))
    }
}

/// Parses the YAML block between the leading `---` fence and the next `---` line.
pub fn parse_front_matter(input: &str) -> Result<RawMetadata, String> {
    let rest = input
        .strip_prefix(FENCE)
        .and_then(|rest| rest.strip_prefix('\n'))
        .ok_or_else(|| "metadata block must begin with `---`".to_string())?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            if yaml.trim().is_empty() {
                return Ok(RawMetadata::default());
            }
            return serde_yaml::from_str(yaml).map_err(|e| format!("invalid metadata: {e}"));
        }
        offset += line.len();
    }
    Err("metadata block is missing the closing `---`".to_string())
}

/// In-memory source used by tests across the crate.
#[cfg(test)]
pub struct MemorySource {
    items: Vec<(ItemId, Result<RawMetadata, String>)>,
}

#[cfg(test)]
impl MemorySource {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with(mut self, id: &str, title: &str, date: &str, tags: &[&str]) -> Self {
        self.items.push((
            ItemId::from(id),
            Ok(RawMetadata {
                title: Some(title.to_string()),
                date: Some(date.to_string()),
                tags: tags.iter().map(|tag| tag.to_string()).collect(),
                ..RawMetadata::default()
            }),
        ));
        self
    }

    pub fn with_raw(mut self, id: &str, raw: RawMetadata) -> Self {
        self.items.push((ItemId::from(id), Ok(raw)));
        self
    }

    pub fn with_broken(mut self, id: &str, reason: &str) -> Self {
        self.items.push((ItemId::from(id), Err(reason.to_string())));
        self
    }
}

#[cfg(test)]
impl ContentSource for MemorySource {
    async fn list(&self) -> Result<Vec<ItemId>, BarErr> {
        Ok(self.items.iter().map(|(id, _)| id.clone()).collect())
    }

    async fn load(&self, id: &ItemId) -> Result<RawMetadata, BarErr> {
        match self.items.iter().find(|(item, _)| item == id) {
            Some((_, Ok(raw))) => Ok(raw.clone()),
            Some((_, Err(reason))) => Err(BarErr::extraction(id.as_str(), reason.as_str())),
            None => Err(BarErr::extraction(id.as_str(), "no such item")),
        }
    }
}
