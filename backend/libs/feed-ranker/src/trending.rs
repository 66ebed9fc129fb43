//! Trending score
//!
//! `score = (likes + COMMENT_WEIGHT * comments) / max(1, age_hours) ^ TRENDING_GRAVITY`
//!
//! Both constants are fixed; changing them changes every trending page.

use chrono::{DateTime, Utc};

/// Decay exponent applied to post age
pub const TRENDING_GRAVITY: f64 = 1.8;

/// A comment counts as this many likes
pub const COMMENT_WEIGHT: f64 = 2.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Fractional hours between `created_at` and `now`, floored at one hour.
///
/// Posts stamped in the future also land on the floor.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let hours = (now - created_at).num_milliseconds() as f64 / MILLIS_PER_HOUR;
    hours.max(1.0)
}

pub fn trending_score(
    like_count: u32,
    comment_count: u32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let engagement = like_count as f64 + COMMENT_WEIGHT * comment_count as f64;
    engagement / age_hours(created_at, now).powf(TRENDING_GRAVITY)
}
