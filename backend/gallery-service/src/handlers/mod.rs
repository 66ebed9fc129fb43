//! HTTP handlers for gallery-service

pub mod comments;
pub mod feed;
pub mod health;
pub mod images;
pub mod likes;

use actix_web::web;

/// Register every gallery route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(health::metrics)
        .service(feed::get_feed)
        .service(images::get_image)
        .service(images::delete_image)
        .service(images::get_user_images)
        .service(likes::like_image)
        .service(likes::unlike_image)
        .service(likes::get_likes)
        .service(comments::add_comment)
        .service(comments::list_comments);
}
