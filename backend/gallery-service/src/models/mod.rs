use chrono::{DateTime, Utc};
use feed_ranker::FeedItem;
use serde::{Deserialize, Serialize};

/// Gallery image joined with its author and engagement counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub comment_count: u32,
    /// Whether the requesting user has liked this image (false for guests)
    #[serde(default)]
    pub user_has_liked: bool,
}

impl FeedItem for GalleryImage {
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
        self.categories.iter().any(|c| c == category)
    }
}

/// Feed response. Field names are relied on by the web client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub images: Vec<GalleryImage>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub images: Vec<GalleryImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "like_id")]
    pub id: i64,
    pub image_id: i64,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    pub image_id: i64,
    pub likes: i64,
    pub user_has_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub image_id: i64,
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_response_uses_client_field_names() {
        let response = FeedResponse {
            images: vec![],
            has_more: true,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["hasMore"], true);
        assert!(json["images"].as_array().unwrap().is_empty());
        assert!(json.get("has_more").is_none());
    }

    #[test]
    fn test_like_summary_is_camel_case() {
        let summary = LikeSummary {
            image_id: 4,
            likes: 2,
            user_has_liked: true,
        };
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["imageId"], 4);
        assert_eq!(json["userHasLiked"], true);
    }

    #[test]
    fn test_image_category_lookup() {
        let image = GalleryImage {
            id: 1,
            user_id: 2,
            username: "sakura".into(),
            profile_picture: None,
            image_url: "/images/1.png".into(),
            prompt: None,
            categories: vec!["anime".into(), "portraits".into()],
            created_at: Utc::now(),
            like_count: 0,
            comment_count: 0,
            user_has_liked: false,
        };

        assert!(image.has_category("portraits"));
        assert!(!image.has_category("abstract"));
    }
}
