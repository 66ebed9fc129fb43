//! # Feed Ranker
//!
//! Ordering and pagination for the gallery feed.
//!
//! Given a snapshot of posts with their engagement counts and a [`FeedQuery`],
//! [`rank_and_page`] filters by category (and by time window when trending),
//! sorts under the requested [`SortMode`] and slices out one [`FeedPage`].
//!
//! The crate performs no I/O and never reads the clock: callers pass `now`.
//! Every sort mode breaks ties by post id descending, so repeated calls on an
//! unchanged snapshot produce identical page boundaries.

pub mod error;
pub mod item;
pub mod query;
pub mod ranker;
pub mod trending;

pub use error::{RankError, Result};
pub use item::{FeedItem, Post};
pub use query::{FeedQuery, SortMode, TimeRange, ALL_CATEGORIES};
pub use ranker::{rank_and_page, FeedPage};
pub use trending::{trending_score, COMMENT_WEIGHT, TRENDING_GRAVITY};
