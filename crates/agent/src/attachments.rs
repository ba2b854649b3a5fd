//! Attachment lookup
//!
//! Documents are read from a directory on first use and kept in memory
//! afterwards. A miss is not remembered, so a file uploaded later is picked
//! up by the next lookup.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use chat_agent_core::{Attachment, AttachmentSource, Error, Result};

/// Reads attachments from a local directory
#[derive(Debug, Clone)]
pub struct FileAttachmentSource {
    dir: PathBuf,
}

impl FileAttachmentSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if name.is_empty() || !plain {
            return Err(Error::InvalidInput(format!("attachment name {:?}", name)));
        }
        Ok(self.dir.join(relative))
    }
}

#[async_trait]
impl AttachmentSource for FileAttachmentSource {
    async fn fetch(&self, name: &str) -> Result<Option<Attachment>> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::debug!(path = %path.display(), size = bytes.len(), "Loaded attachment");
                Ok(Some(Attachment::new(
                    name,
                    Attachment::mime_type_for(name),
                    bytes,
                )))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Attachment(format!("{}: {}", path.display(), e))),
        }
    }
}

/// In-memory cache in front of an attachment source
pub struct AttachmentCache {
    source: Arc<dyn AttachmentSource>,
    loaded: RwLock<HashMap<String, Attachment>>,
}

impl AttachmentCache {
    pub fn new(source: Arc<dyn AttachmentSource>) -> Self {
        Self {
            source,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Cached copy, or fetch and keep it on success
    pub async fn get(&self, name: &str) -> Result<Option<Attachment>> {
        let cached = self.loaded.read().get(name).cloned();
        if cached.is_some() {
            return Ok(cached);
        }

        let fetched = self.source.fetch(name).await?;
        if let Some(attachment) = &fetched {
            self.loaded
                .write()
                .insert(name.to_string(), attachment.clone());
        }
        Ok(fetched)
    }

    /// Warm the cache at startup; returns whether the document exists
    pub async fn preload(&self, name: &str) -> bool {
        match self.get(name).await {
            Ok(Some(attachment)) => {
                tracing::info!(name, size = attachment.len(), "Attachment preloaded");
                true
            },
            Ok(None) => {
                tracing::warn!(
                    name,
                    "Attachment not found, schedule requests will get a warning text"
                );
                false
            },
            Err(e) => {
                tracing::warn!(name, error = %e, "Failed to preload attachment");
                false
            },
        }
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.loaded.read().contains_key(name)
    }
}
