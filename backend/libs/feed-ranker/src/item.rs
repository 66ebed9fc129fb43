use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Anything the ranker can order.
///
/// Implemented by [`Post`] and by richer storage rows (e.g. a gallery image
/// joined with its author) so they can be ranked without conversion.
pub trait FeedItem {
    fn id(&self) -> i64;
    fn created_at(&self) -> DateTime<Utc>;
    fn like_count(&self) -> u32;
    fn comment_count(&self) -> u32;
    fn has_category(&self, category: &str) -> bool;
}

/// Post summary as seen by the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Post {
    pub fn new(id: i64, author_id: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author_id,
            created_at,
            like_count: 0,
            comment_count: 0,
            categories: BTreeSet::new(),
        }
    }

    pub fn with_counts(mut self, like_count: u32, comment_count: u32) -> Self {
        self.like_count = like_count;
        self.comment_count = comment_count;
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

impl FeedItem for Post {
    fn id(&self) -> i64 {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn like_count(&self) -> u32 {
        self.like_count
    }

    fn comment_count(&self) -> u32 {
        self.comment_count
    }

    fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_missing_counts_and_categories_default_to_neutral() {
        let json = r#"{"id": 7, "author_id": 3, "created_at": "2024-01-01T00:00:00Z"}"#;
        let post: Post = serde_json::from_str(json).unwrap();

        assert_eq!(post.like_count, 0);
        assert_eq!(post.comment_count, 0);
        assert!(post.categories.is_empty());
        assert!(!post.has_category("anime"));
    }

    #[test]
    fn test_builder_sets_categories() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let post = Post::new(1, 1, created)
            .with_counts(4, 2)
            .with_categories(["anime", "portraits"]);

        assert!(post.has_category("anime"));
        assert!(!post.has_category("landscapes"));
        assert_eq!(FeedItem::like_count(&post), 4);
        assert_eq!(FeedItem::comment_count(&post), 2);
    }
}
