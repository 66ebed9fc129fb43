use chrono::{DateTime, Utc};
use feed_ranker::{rank_and_page, FeedQuery, SortMode, TimeRange};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::db::{CandidateFilter, ImageStore};
use crate::error::Result;
use crate::metrics;
use crate::models::FeedResponse;

/// Query string of `GET /images`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedParams {
    pub sort_type: Option<String>,
    pub time_range: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Translate request parameters into a validated [`FeedQuery`].
///
/// `limit` above the configured maximum is clamped; zero or negative values
/// are rejected along with `page < 1`.
pub fn build_query(params: &FeedParams, config: &FeedConfig) -> Result<FeedQuery> {
    let sort_mode = match non_blank(&params.sort_type) {
        Some(s) => s.parse::<SortMode>()?,
        None => SortMode::default(),
    };
    let time_range = match non_blank(&params.time_range) {
        Some(s) => s.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };

    let page = params.page.unwrap_or(1);
    let page_size = params
        .limit
        .unwrap_or(config.default_page_size)
        .min(config.max_page_size);

    let mut query = FeedQuery::new(sort_mode, page, page_size).with_time_range(time_range);
    if let Some(category) = non_blank(&params.category) {
        query = query.with_category(category);
    }

    query.validate()?;
    Ok(query)
}

/// Store pre-filter for `query`.
///
/// Count and recency sorts only need the rows up to the end of the requested
/// page plus one to decide `has_more`. Trending is bounded by its time window.
pub fn candidate_filter(query: &FeedQuery, now: DateTime<Utc>) -> CandidateFilter {
    let limit = match query.sort_mode {
        SortMode::Trending => None,
        _ => Some(
            query
                .page
                .saturating_mul(query.page_size)
                .saturating_add(1),
        ),
    };

    CandidateFilter {
        category: query.category_filter().map(String::from),
        created_after: query.time_cutoff(now),
        order: query.sort_mode,
        limit,
    }
}

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn ImageStore>,
    config: FeedConfig,
}

impl FeedService {
    pub fn new(store: Arc<dyn ImageStore>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// One feed page for `viewer` (None for guests) as of `now`
    pub async fn get_feed(
        &self,
        params: &FeedParams,
        viewer: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<FeedResponse> {
        let query = match build_query(params, &self.config) {
            Ok(query) => query,
            Err(e) => {
                metrics::record_feed_request("invalid", false);
                return Err(e);
            }
        };
        let sort_label = query.sort_mode.as_str();

        let filter = candidate_filter(&query, now);

        let candidates = match self.store.feed_candidates(&filter).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(sort_mode = sort_label, "Failed to load feed candidates: {}", e);
                metrics::record_feed_request(sort_label, false);
                return Err(e);
            }
        };

        let candidate_count = candidates.len();
        let started = Instant::now();
        let page = rank_and_page(candidates, &query, now)?;
        metrics::record_ranking(sort_label, candidate_count, started.elapsed());

        let mut images = page.items;
        if let Some(user_id) = viewer {
            let ids: Vec<i64> = images.iter().map(|image| image.id).collect();
            let liked = self.store.liked_image_ids(user_id, &ids).await?;
            for image in &mut images {
                image.user_has_liked = liked.contains(&image.id);
            }
        }

        debug!(
            sort_mode = sort_label,
            page = query.page,
            returned = images.len(),
            has_more = page.has_more,
            "Served feed page"
        );
        metrics::record_feed_request(sort_label, true);

        Ok(FeedResponse {
            images,
            has_more: page.has_more,
        })
    }
}
