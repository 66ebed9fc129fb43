use actix_web::{delete, get, web, HttpResponse};
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{ImageListResponse, MessageResponse};
use crate::AppState;

#[get("/images/{id}")]
pub async fn get_image(
    path: web::Path<i64>,
    viewer: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();

    let mut image = state
        .store
        .get_image(image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    if let Some(user) = viewer {
        let liked = state.store.liked_image_ids(user.id, &[image_id]).await?;
        image.user_has_liked = liked.contains(&image_id);
    }

    Ok(HttpResponse::Ok().json(image))
}

/// Delete an image. Only its author or an admin may do this.
#[delete("/images/{id}")]
pub async fn delete_image(
    path: web::Path<i64>,
    user: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let image_id = path.into_inner();

    let image = state
        .store
        .get_image(image_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image {} not found", image_id)))?;

    if image.user_id != user.id && !user.is_admin() {
        warn!(
            image_id,
            user_id = user.id,
            "Rejected image deletion by non-owner"
        );
        return Err(AppError::Forbidden(
            "You can only delete your own images".to_string(),
        ));
    }

    if !state.store.delete_image(image_id).await? {
        return Err(AppError::NotFound(format!("Image {} not found", image_id)));
    }

    info!(image_id, user_id = user.id, "Image deleted");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Image deleted successfully")))
}

#[get("/users/{id}/images")]
pub async fn get_user_images(
    path: web::Path<i64>,
    viewer: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let mut images = state.store.user_images(user_id).await?;

    if let Some(viewer) = viewer {
        let ids: Vec<i64> = images.iter().map(|image| image.id).collect();
        let liked = state.store.liked_image_ids(viewer.id, &ids).await?;
        for image in &mut images {
            image.user_has_liked = liked.contains(&image.id);
        }
    }

    Ok(HttpResponse::Ok().json(ImageListResponse { images }))
}
