//! Process-lifetime record store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::records::{Comment, Review};
use super::RecordStore;
use crate::error::Result;

/// Keeps records in memory; everything is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    comments: RwLock<HashMap<String, Vec<Comment>>>,
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of comments across all characters.
    pub fn comment_count(&self) -> usize {
        self.comments.read().values().map(Vec::len).sum()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append_comment(&self, comment: Comment) -> Result<()> {
        self.comments
            .write()
            .entry(comment.character_id.clone())
            .or_default()
            .push(comment);
        Ok(())
    }

    async fn list_comments(&self, character_id: &str) -> Result<Vec<Comment>> {
        Ok(self
            .comments
            .read()
            .get(character_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_review(&self, review: Review) -> Result<()> {
        self.reviews.write().push(review);
        Ok(())
    }

    async fn list_reviews(&self) -> Result<Vec<Review>> {
        Ok(self.reviews.read().clone())
    }
}
