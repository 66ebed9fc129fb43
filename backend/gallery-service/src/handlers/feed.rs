use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::FeedParams;
use crate::AppState;

/// Ranked, paginated gallery feed
#[get("/images")]
pub async fn get_feed(
    query: web::Query<FeedParams>,
    viewer: Option<AuthUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let viewer_id = viewer.map(|user| user.id);
    let response = state.feed.get_feed(&query, viewer_id, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(response))
}
