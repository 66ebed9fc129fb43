//! Service layer for gallery-service
//!
//! - feed: candidate loading, ranking and viewer like-state for `/images`

pub mod feed;

pub use feed::{build_query, FeedParams, FeedService};
