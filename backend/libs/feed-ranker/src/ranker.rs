use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

use crate::error::Result;
use crate::item::FeedItem;
use crate::query::{FeedQuery, SortMode};
use crate::trending::trending_score;

/// One page of ranked items plus a continuation flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> FeedPage<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U, F>(self, f: F) -> FeedPage<U>
    where
        F: FnMut(T) -> U,
    {
        FeedPage {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}

/// Filter, sort and slice `posts` for `query`.
///
/// `now` drives both the trending window cutoff and post age. The result is a
/// pure function of the arguments.
///
/// # Errors
/// [`RankError::InvalidArgument`](crate::RankError::InvalidArgument) when
/// `page < 1` or `page_size <= 0`.
pub fn rank_and_page<T: FeedItem>(
    posts: Vec<T>,
    query: &FeedQuery,
    now: DateTime<Utc>,
) -> Result<FeedPage<T>> {
    query.validate()?;

    let candidates = posts.len();
    let category = query.category_filter();
    let cutoff = query.time_cutoff(now);

    let mut ranked: Vec<T> = posts
        .into_iter()
        .filter(|post| category.map_or(true, |c| post.has_category(c)))
        .filter(|post| cutoff.map_or(true, |c| post.created_at() > c))
        .collect();

    sort_items(&mut ranked, query.sort_mode, now);

    let page = paginate(ranked, query.page, query.page_size);

    debug!(
        sort_mode = %query.sort_mode,
        category = category.unwrap_or("all"),
        candidates,
        page = query.page,
        returned = page.items.len(),
        has_more = page.has_more,
        "Feed ranked"
    );

    Ok(page)
}

fn by_id_desc<T: FeedItem>(a: &T, b: &T) -> Ordering {
    b.id().cmp(&a.id())
}

fn sort_items<T: FeedItem>(items: &mut Vec<T>, mode: SortMode, now: DateTime<Utc>) {
    match mode {
        SortMode::Newest => items.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| by_id_desc(a, b))
        }),
        SortMode::MostLiked => items.sort_by(|a, b| {
            b.like_count()
                .cmp(&a.like_count())
                .then_with(|| by_id_desc(a, b))
        }),
        SortMode::MostCommented => items.sort_by(|a, b| {
            b.comment_count()
                .cmp(&a.comment_count())
                .then_with(|| by_id_desc(a, b))
        }),
        SortMode::Trending => {
            // Score once per item instead of once per comparison
            let mut scored: Vec<(f64, T)> = std::mem::take(items)
                .into_iter()
                .map(|item| {
                    let score = trending_score(
                        item.like_count(),
                        item.comment_count(),
                        item.created_at(),
                        now,
                    );
                    (score, item)
                })
                .collect();

            scored.sort_by(|(score_a, a), (score_b, b)| {
                score_b.total_cmp(score_a).then_with(|| by_id_desc(a, b))
            });

            items.extend(scored.into_iter().map(|(_, item)| item));
        }
    }
}

fn paginate<T>(ranked: Vec<T>, page: i64, page_size: i64) -> FeedPage<T> {
    // validate() guarantees page >= 1 and page_size >= 1
    let size = usize::try_from(page_size).unwrap_or(usize::MAX);
    let offset = usize::try_from((page - 1).saturating_mul(page_size)).unwrap_or(usize::MAX);
    let end = offset.saturating_add(size);

    let total = ranked.len();
    let items: Vec<T> = ranked.into_iter().skip(offset).take(size).collect();

    FeedPage {
        items,
        has_more: total > end,
    }
}
