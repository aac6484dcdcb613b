//! Persistence of accepted comments and reviews.

mod json_file;
mod memory;
mod records;

use async_trait::async_trait;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use records::{Comment, Review};

use crate::error::Result;

/// Trait for record store implementations.
///
/// Records handed to a store have already been validated and sanitized.
/// Comments are grouped by character page; reviews form a single list.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append a comment to its character's list.
    async fn append_comment(&self, comment: Comment) -> Result<()>;

    /// All comments for a character, oldest first.
    async fn list_comments(&self, character_id: &str) -> Result<Vec<Comment>>;

    /// Append a review.
    async fn append_review(&self, review: Review) -> Result<()>;

    /// All reviews, oldest first.
    async fn list_reviews(&self) -> Result<Vec<Review>>;
}
