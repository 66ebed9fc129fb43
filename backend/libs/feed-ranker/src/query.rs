use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{RankError, Result};

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Feed ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "newest")]
    Newest,
    #[serde(rename = "mostLiked", alias = "most_liked")]
    MostLiked,
    #[serde(rename = "mostCommented", alias = "most_commented")]
    MostCommented,
    #[serde(rename = "trending")]
    Trending,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::MostLiked => "mostLiked",
            Self::MostCommented => "mostCommented",
            Self::Trending => "trending",
        }
    }
}

impl FromStr for SortMode {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" => Ok(Self::Newest),
            "mostLiked" | "most_liked" => Ok(Self::MostLiked),
            "mostCommented" | "most_commented" => Ok(Self::MostCommented),
            "trending" => Ok(Self::Trending),
            other => Err(RankError::InvalidArgument(format!(
                "unknown sort mode '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Time window applied to the trending sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Window length. Months are 30 days and years 365 days.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::hours(24),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Year => Duration::days(365),
        }
    }

    /// Posts created at or before this instant fall outside the window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl FromStr for TimeRange {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(RankError::InvalidArgument(format!(
                "unknown time range '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One feed request. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedQuery {
    pub sort_mode: SortMode,
    /// Only consulted when `sort_mode` is [`SortMode::Trending`]
    #[serde(default)]
    pub time_range: TimeRange,
    #[serde(default)]
    pub category: Option<String>,
    /// 1-based
    pub page: i64,
    pub page_size: i64,
}

impl FeedQuery {
    pub fn new(sort_mode: SortMode, page: i64, page_size: i64) -> Self {
        Self {
            sort_mode,
            time_range: TimeRange::default(),
            category: None,
            page,
            page_size,
        }
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page < 1 {
            return Err(RankError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if self.page_size <= 0 {
            return Err(RankError::InvalidArgument(format!(
                "page_size must be > 0, got {}",
                self.page_size
            )));
        }
        Ok(())
    }

    /// Category to filter on, `None` for "all" or blank.
    pub fn category_filter(&self) -> Option<&str> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c == ALL_CATEGORIES => None,
            Some(c) => Some(c),
        }
    }

    /// Creation cutoff for this query, present only for trending.
    pub fn time_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.sort_mode {
            SortMode::Trending => Some(self.time_range.cutoff(now)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_mode_parses_client_and_snake_case_spellings() {
        assert_eq!("newest".parse::<SortMode>().unwrap(), SortMode::Newest);
        assert_eq!("mostLiked".parse::<SortMode>().unwrap(), SortMode::MostLiked);
        assert_eq!("most_liked".parse::<SortMode>().unwrap(), SortMode::MostLiked);
        assert_eq!(
            "mostCommented".parse::<SortMode>().unwrap(),
            SortMode::MostCommented
        );
        assert_eq!("trending".parse::<SortMode>().unwrap(), SortMode::Trending);
    }

    #[test]
    fn test_unknown_sort_mode_is_invalid_argument() {
        let err = "hottest".parse::<SortMode>().unwrap_err();
        assert!(matches!(err, RankError::InvalidArgument(_)));
    }

    #[test]
    fn test_sort_mode_serde_uses_wire_names() {
        let json = serde_json::to_string(&SortMode::MostCommented).unwrap();
        assert_eq!(json, "\"mostCommented\"");
        let parsed: SortMode = serde_json::from_str("\"most_liked\"").unwrap();
        assert_eq!(parsed, SortMode::MostLiked);
    }

    #[test]
    fn test_time_range_durations() {
        assert_eq!(TimeRange::Day.duration(), Duration::hours(24));
        assert_eq!(TimeRange::Week.duration(), Duration::days(7));
        assert_eq!(TimeRange::Month.duration(), Duration::days(30));
        assert_eq!(TimeRange::Year.duration(), Duration::days(365));
        assert!("fortnight".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_category_filter_treats_all_as_unfiltered() {
        let query = FeedQuery::new(SortMode::Newest, 1, 20);
        assert_eq!(query.category_filter(), None);
        assert_eq!(query.clone().with_category("all").category_filter(), None);
        assert_eq!(query.clone().with_category("  ").category_filter(), None);
        assert_eq!(
            query.with_category("anime").category_filter(),
            Some("anime")
        );
    }

    #[test]
    fn test_time_cutoff_only_for_trending() {
        let now = Utc::now();
        let newest = FeedQuery::new(SortMode::Newest, 1, 20);
        assert!(newest.time_cutoff(now).is_none());

        let trending =
            FeedQuery::new(SortMode::Trending, 1, 20).with_time_range(TimeRange::Day);
        assert_eq!(trending.time_cutoff(now), Some(now - Duration::hours(24)));
    }

    #[test]
    fn test_validate_rejects_bad_paging() {
        assert!(FeedQuery::new(SortMode::Newest, 0, 20).validate().is_err());
        assert!(FeedQuery::new(SortMode::Newest, -3, 20).validate().is_err());
        assert!(FeedQuery::new(SortMode::Newest, 1, 0).validate().is_err());
        assert!(FeedQuery::new(SortMode::Newest, 1, -1).validate().is_err());
        assert!(FeedQuery::new(SortMode::Newest, 1, 1).validate().is_ok());
    }
}
