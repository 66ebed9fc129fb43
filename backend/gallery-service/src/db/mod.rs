//! Storage collaborator for the gallery
//!
//! Handlers and the feed service only see [`ImageStore`]; [`PgImageStore`]
//! is the PostgreSQL implementation.

pub mod image_store;

pub use image_store::PgImageStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_ranker::SortMode;
use std::collections::HashSet;

use crate::error::Result;
use crate::models::{Comment, GalleryImage, Like};

/// Pre-filter for feed candidates.
///
/// The ranker re-applies the category and time filters. When `limit` is set
/// the store must return the first `limit` rows of the full `order`, so the
/// ranked prefix matches ranking the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub category: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub order: SortMode,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Images with author and engagement counts, ordered by `filter.order`
    /// with ties broken by id descending
    async fn feed_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GalleryImage>>;

    /// Subset of `image_ids` liked by `user_id`
    async fn liked_image_ids(&self, user_id: i64, image_ids: &[i64]) -> Result<HashSet<i64>>;

    async fn get_image(&self, image_id: i64) -> Result<Option<GalleryImage>>;

    /// Returns false when no such image existed
    async fn delete_image(&self, image_id: i64) -> Result<bool>;

    /// Images posted by `user_id`, newest first
    async fn user_images(&self, user_id: i64) -> Result<Vec<GalleryImage>>;

    /// Fails with `NotFound` for a missing image and `Conflict` for a repeat like
    async fn add_like(&self, user_id: i64, image_id: i64) -> Result<Like>;

    /// Returns false when the like did not exist
    async fn remove_like(&self, user_id: i64, image_id: i64) -> Result<bool>;

    async fn like_count(&self, image_id: i64) -> Result<i64>;

    /// Fails with `NotFound` for a missing image
    async fn add_comment(&self, user_id: i64, image_id: i64, comment: &str) -> Result<Comment>;

    /// Comments on an image, oldest first
    async fn list_comments(&self, image_id: i64) -> Result<Vec<Comment>>;
}
