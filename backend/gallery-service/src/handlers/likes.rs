use actix_web::{delete, get, post, web, HttpResponse};
use tracing::info;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::AuthUser;
use crate::models::{LikeSummary, MessageResponse};
use crate::AppState;

#[post("/images/{id}/likes")]
pub async fn like_image(
    path: web::Path<i64>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();
    let like = state.store.add_like(user.id, image_id).await?;

    metrics::record_engagement("like");
    info!(image_id, user_id = user.id, "Image liked");

    Ok(HttpResponse::Created().json(like))
}

#[delete("/images/{id}/likes")]
pub async fn unlike_image(
    path: web::Path<i64>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();

    if !state.store.remove_like(user.id, image_id).await? {
        return Err(AppError::NotFound("Like not found".to_string()));
    }

    metrics::record_engagement("unlike");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Like removed successfully")))
}

#[get("/images/{id}/likes")]
pub async fn get_likes(
    path: web::Path<i64>,
    viewer: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();
    let likes = state.store.like_count(image_id).await?;

    let user_has_liked = match viewer {
        Some(user) => state
            .store
            .liked_image_ids(user.id, &[image_id])
            .await?
            .contains(&image_id),
        None => false,
    };

    Ok(HttpResponse::Ok().json(LikeSummary {
        image_id,
        likes,
        user_has_liked,
    }))
}
