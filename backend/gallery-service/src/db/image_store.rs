/// PostgreSQL-backed image store
///
/// Counts are aggregated per query from `likes` and `comments`; there are no
/// denormalized counters to keep in sync.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_ranker::SortMode;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{debug, error};

use super::{CandidateFilter, ImageStore};
use crate::error::{AppError, Result};
use crate::models::{Comment, GalleryImage, Like};

const IMAGE_SELECT: &str = r#"
    SELECT
        i.id,
        i.user_id,
        u.username,
        u.profile_picture,
        i.image_url,
        i.prompt,
        i.categories,
        i.created_at,
        (SELECT COUNT(*) FROM likes l WHERE l.image_id = i.id) AS like_count,
        (SELECT COUNT(*) FROM comments c WHERE c.image_id = i.id) AS comment_count
    FROM images i
    JOIN users u ON u.id = i.user_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: i64,
    user_id: i64,
    username: String,
    profile_picture: Option<String>,
    image_url: String,
    prompt: Option<String>,
    categories: Vec<String>,
    created_at: DateTime<Utc>,
    like_count: i64,
    comment_count: i64,
}

/// SQL ordering matching the ranker's order for `mode`. `LIMIT NULL` is
/// unbounded, so trending only relies on its time window.
fn order_clause(mode: SortMode) -> &'static str {
    match mode {
        SortMode::Newest | SortMode::Trending => "i.created_at DESC, i.id DESC",
        SortMode::MostLiked => "like_count DESC, i.id DESC",
        SortMode::MostCommented => "comment_count DESC, i.id DESC",
    }
}

fn clamp_count(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

impl From<ImageRow> for GalleryImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            username: row.username,
            profile_picture: row.profile_picture,
            image_url: row.image_url,
            prompt: row.prompt,
            categories: row.categories,
            created_at: row.created_at,
            like_count: clamp_count(row.like_count),
            comment_count: clamp_count(row.comment_count),
            user_has_liked: false,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LikeRow {
    id: i64,
    image_id: i64,
    user_id: i64,
    username: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    image_id: i64,
    user_id: i64,
    username: String,
    profile_picture: Option<String>,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            image_id: row.image_id,
            user_id: row.user_id,
            username: row.username,
            profile_picture: row.profile_picture,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_image_exists(&self, image_id: i64) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM images WHERE id = $1)")
                .bind(image_id)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Image {} not found", image_id)))
        }
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    async fn feed_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GalleryImage>> {
        let sql = format!(
            r#"{IMAGE_SELECT}
            WHERE ($1::TEXT IS NULL OR $1 = ANY(i.categories))
              AND ($2::TIMESTAMPTZ IS NULL OR i.created_at > $2)
            ORDER BY {order}
            LIMIT $3
            "#,
            order = order_clause(filter.order)
        );

        let rows = sqlx::query_as::<_, ImageRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.created_after)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to fetch feed candidates: {}", e);
                AppError::from(e)
            })?;

        debug!(
            category = filter.category.as_deref().unwrap_or("all"),
            order = %filter.order,
            limit = ?filter.limit,
            count = rows.len(),
            "Fetched feed candidates"
        );

        Ok(rows.into_iter().map(GalleryImage::from).collect())
    }

    async fn liked_image_ids(&self, user_id: i64, image_ids: &[i64]) -> Result<HashSet<i64>> {
        if image_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT image_id
            FROM likes
            WHERE user_id = $1 AND image_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(image_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }

    async fn get_image(&self, image_id: i64) -> Result<Option<GalleryImage>> {
        let sql = format!("{IMAGE_SELECT} WHERE i.id = $1");

        let row = sqlx::query_as::<_, ImageRow>(&sql)
            .bind(image_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(GalleryImage::from))
    }

    async fn delete_image(&self, image_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete image {}: {}", image_id, e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn user_images(&self, user_id: i64) -> Result<Vec<GalleryImage>> {
        let sql = format!(
            "{IMAGE_SELECT} WHERE i.user_id = $1 ORDER BY i.created_at DESC, i.id DESC"
        );

        let rows = sqlx::query_as::<_, ImageRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(GalleryImage::from).collect())
    }

    async fn add_like(&self, user_id: i64, image_id: i64) -> Result<Like> {
        self.ensure_image_exists(image_id).await?;

        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            WITH inserted AS (
                INSERT INTO likes (user_id, image_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, image_id) DO NOTHING
                RETURNING id, image_id, user_id, created_at
            )
            SELECT ins.id, ins.image_id, ins.user_id, u.username, ins.created_at
            FROM inserted ins
            JOIN users u ON u.id = ins.user_id
            "#,
        )
        .bind(user_id)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| {
            AppError::Conflict("You have already liked this image".to_string())
        })?;

        Ok(Like {
            id: row.id,
            image_id: row.image_id,
            user_id: row.user_id,
            username: row.username,
            created_at: row.created_at,
        })
    }

    async fn remove_like(&self, user_id: i64, image_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND image_id = $2")
            .bind(user_id)
            .bind(image_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn like_count(&self, image_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE image_id = $1")
            .bind(image_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn add_comment(&self, user_id: i64, image_id: i64, comment: &str) -> Result<Comment> {
        self.ensure_image_exists(image_id).await?;

        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (user_id, image_id, comment)
                VALUES ($1, $2, $3)
                RETURNING id, image_id, user_id, comment, created_at
            )
            SELECT ins.id, ins.image_id, ins.user_id, u.username, u.profile_picture,
                   ins.comment, ins.created_at
            FROM inserted ins
            JOIN users u ON u.id = ins.user_id
            "#,
        )
        .bind(user_id)
        .bind(image_id)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to add comment on image {}: {}", image_id, e);
            AppError::from(e)
        })?;

        Ok(row.into())
    }

    async fn list_comments(&self, image_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.image_id, c.user_id, u.username, u.profile_picture,
                   c.comment, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.image_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_clause_breaks_ties_by_id() {
        for mode in [
            SortMode::Newest,
            SortMode::MostLiked,
            SortMode::MostCommented,
            SortMode::Trending,
        ] {
            assert!(order_clause(mode).ends_with("i.id DESC"), "{}", mode);
        }
        assert!(order_clause(SortMode::MostLiked).starts_with("like_count"));
        assert!(order_clause(SortMode::MostCommented).starts_with("comment_count"));
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-1), 0);
        assert_eq!(clamp_count(42), 42);
        assert_eq!(clamp_count(i64::MAX), u32::MAX);
    }
}
