//! Gallery service for Anime.AI
//!
//! Serves the public image gallery: ranked feed, image detail and deletion,
//! likes and comments. Ranking itself lives in the `feed-ranker` crate.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use config::FeedConfig;
use db::ImageStore;
use services::FeedService;

/// Shared per-worker application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ImageStore>,
    pub feed: FeedService,
}

impl AppState {
    pub fn new(store: Arc<dyn ImageStore>, feed_config: FeedConfig) -> Self {
        let feed = FeedService::new(store.clone(), feed_config);
        Self { store, feed }
    }
}
