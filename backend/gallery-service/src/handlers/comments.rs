use actix_web::{get, post, web, HttpResponse};
use tracing::info;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::AuthUser;
use crate::models::{CommentListResponse, NewComment};
use crate::AppState;

pub const MAX_COMMENT_CHARS: usize = 2000;

/// Trimmed comment text, or `BadRequest` when empty or too long
pub fn validate_comment(raw: &str) -> Result<&str> {
    let comment = raw.trim();
    if comment.is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
    }
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Comment cannot exceed {} characters",
            MAX_COMMENT_CHARS
        )));
    }
    Ok(comment)
}

#[post("/images/{id}/comments")]
pub async fn add_comment(
    path: web::Path<i64>,
    body: web::Json<NewComment>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();
    let text = validate_comment(&body.comment)?;

    let comment = state.store.add_comment(user.id, image_id, text).await?;

    metrics::record_engagement("comment");
    info!(image_id, user_id = user.id, comment_id = comment.id, "Comment added");

    Ok(HttpResponse::Created().json(comment))
}

#[get("/images/{id}/comments")]
pub async fn list_comments(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let comments = state.store.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CommentListResponse { comments }))
}
