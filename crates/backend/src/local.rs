//! Local file-backed backend.
//!
//! The demo/"become a seller" path: the in-process store bootstrapped from
//! a JSON data file and flushed back to it after every mutation. A missing
//! or malformed file is treated as absent and replaced by the next flush,
//! so a corrupted demo file can never take the application down.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use sokoni_core::Email;

use crate::document::{DocumentRef, Snapshot, WriteMode};
use crate::memory::{MemoryBackend, StateDump};
use crate::store::{AuthError, Backend, DocumentWatch, Identity, StoreError};

/// File-backed implementation of [`Backend`].
pub struct LocalBackend {
    memory: MemoryBackend,
    data_file: PathBuf,
    media_dir: PathBuf,
}

impl LocalBackend {
    /// Open (or start) the data file at `path`.
    ///
    /// Media blobs land in a `media/` directory next to the data file.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures other than the file being
    /// missing; unparseable content is logged and treated as absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_file = path.into();
        let media_dir = data_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("media");

        let dump = match tokio::fs::read(&data_file).await {
            Ok(bytes) => match serde_json::from_slice::<StateDump>(&bytes) {
                Ok(dump) => dump,
                Err(error) => {
                    warn!(path = %data_file.display(), %error, "data file is malformed, starting empty");
                    StateDump::default()
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => StateDump::default(),
            Err(error) => return Err(StoreError::DataFile(error)),
        };

        Ok(Self {
            memory: MemoryBackend::from_dump(dump),
            data_file,
            media_dir,
        })
    }

    /// Flush the whole store back to the data file.
    ///
    /// Flush failures are logged, not returned: the mutation has already
    /// been applied in memory and watchers have been notified, so the
    /// caller's operation is done - only durability degraded.
    async fn flush(&self) {
        let dump = self.memory.dump();
        let bytes = match serde_json::to_vec_pretty(&dump) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(%error, "could not serialize data file");
                return;
            }
        };
        if let Some(parent) = self.data_file.parent()
            && let Err(error) = tokio::fs::create_dir_all(parent).await
        {
            warn!(path = %parent.display(), %error, "could not create data directory");
            return;
        }
        if let Err(error) = tokio::fs::write(&self.data_file, bytes).await {
            warn!(path = %self.data_file.display(), %error, "could not flush data file");
        }
    }
}

fn reject_traversal(path: &str) -> Result<(), StoreError> {
    let has_traversal = Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if has_traversal || path.is_empty() {
        return Err(StoreError::DataFile(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid media path: {path}"),
        )));
    }
    Ok(())
}

#[async_trait]
impl Backend for LocalBackend {
    async fn read(&self, doc: &DocumentRef) -> Result<Snapshot, StoreError> {
        self.memory.read(doc).await
    }

    async fn write(
        &self,
        doc: &DocumentRef,
        body: Value,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.memory.write(doc, body, mode).await?;
        self.flush().await;
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), StoreError> {
        self.memory.delete(doc).await?;
        self.flush().await;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Snapshot)>, StoreError> {
        self.memory.list(collection).await
    }

    async fn watch(&self, doc: &DocumentRef) -> Result<DocumentWatch, StoreError> {
        self.memory.watch(doc).await
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Identity, AuthError> {
        self.memory.verify_credentials(email, password).await
    }

    async fn register(&self, email: &Email, password: &str) -> Result<Identity, AuthError> {
        let identity = self.memory.register(email, password).await?;
        self.flush().await;
        Ok(identity)
    }

    async fn store_media(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StoreError> {
        reject_traversal(path)?;
        let target = self.media_dir.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(format!("file://{}", target.display()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
