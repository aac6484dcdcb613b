//! Record store backed by a single JSON document on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::records::{Comment, Review};
use super::RecordStore;
use crate::error::Result;

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    comments: Vec<Comment>,
    #[serde(default)]
    reviews: Vec<Review>,
}

/// Persists records to one JSON file, rewritten on every append.
///
/// Appends are serialized through an async mutex, so concurrent submissions
/// in one process never lose each other's writes. Separate processes sharing
/// the file are not coordinated.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store at `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<StoreDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreDocument::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            comments = document.comments.len(),
            reviews = document.reviews.len(),
            "Wrote record store"
        );
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn append_comment(&self, comment: Comment) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.comments.push(comment);
        self.write_document(&document).await
    }

    async fn list_comments(&self, character_id: &str) -> Result<Vec<Comment>> {
        let _guard = self.lock.lock().await;
        let document = self.read_document().await?;
        Ok(document
            .comments
            .into_iter()
            .filter(|c| c.character_id == character_id)
            .collect())
    }

    async fn append_review(&self, review: Review) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        document.reviews.push(review);
        self.write_document(&document).await
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.reviews)
    }
}
