#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed_ranker::SortMode;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use gallery_service::config::FeedConfig;
use gallery_service::db::{CandidateFilter, ImageStore};
use gallery_service::error::{AppError, Result};
use gallery_service::handlers;
use gallery_service::middleware::{Claims, JwtAuthMiddleware, JwtKeys};
use gallery_service::models::{Comment, GalleryImage, Like};
use gallery_service::AppState;

pub const TEST_SECRET: &str = "gallery-test-secret-0123456789";

#[derive(Clone)]
struct StoredImage {
    id: i64,
    user_id: i64,
    categories: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct StoredLike {
    id: i64,
    user_id: i64,
    image_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<i64, String>,
    images: Vec<StoredImage>,
    likes: Vec<StoredLike>,
    comments: Vec<Comment>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn username(&self, user_id: i64) -> String {
        self.users
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| format!("user{}", user_id))
    }

    fn hydrate(&self, image: &StoredImage) -> GalleryImage {
        GalleryImage {
            id: image.id,
            user_id: image.user_id,
            username: self.username(image.user_id),
            profile_picture: None,
            image_url: format!("/uploads/{}.png", image.id),
            prompt: Some(format!("prompt {}", image.id)),
            categories: image.categories.clone(),
            created_at: image.created_at,
            like_count: self.likes.iter().filter(|l| l.image_id == image.id).count() as u32,
            comment_count: self
                .comments
                .iter()
                .filter(|c| c.image_id == image.id)
                .count() as u32,
            user_has_liked: false,
        }
    }

    fn image_exists(&self, image_id: i64) -> bool {
        self.images.iter().any(|i| i.id == image_id)
    }
}

/// In-memory `ImageStore` mirroring the PostgreSQL semantics
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, id: i64, username: &str) {
        self.inner
            .lock()
            .unwrap()
            .users
            .insert(id, username.to_string());
    }

    /// Insert an image posted `age` ago and return its id
    pub fn add_image(&self, user_id: i64, categories: &[&str], age: Duration) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.images.push(StoredImage {
            id,
            user_id,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            created_at: Utc::now() - age,
        });
        id
    }

    pub fn seed_likes(&self, image_id: i64, user_ids: &[i64]) {
        let mut inner = self.inner.lock().unwrap();
        for &user_id in user_ids {
            let id = inner.next_id();
            inner.likes.push(StoredLike {
                id,
                user_id,
                image_id,
                created_at: Utc::now(),
            });
        }
    }

    pub fn seed_comments(&self, image_id: i64, user_id: i64, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        for n in 0..count {
            let id = inner.next_id();
            let username = inner.username(user_id);
            inner.comments.push(Comment {
                id,
                image_id,
                user_id,
                username,
                profile_picture: None,
                comment: format!("comment {}", n),
                created_at: Utc::now(),
            });
        }
    }

    pub fn image_count(&self) -> usize {
        self.inner.lock().unwrap().images.len()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn feed_candidates(&self, filter: &CandidateFilter) -> Result<Vec<GalleryImage>> {
        let inner = self.inner.lock().unwrap();
        let mut images: Vec<GalleryImage> = inner
            .images
            .iter()
            .filter(|i| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| i.categories.contains(c))
            })
            .filter(|i| filter.created_after.map_or(true, |t| i.created_at > t))
            .map(|i| inner.hydrate(i))
            .collect();
        images.sort_by(|a, b| {
            match filter.order {
                SortMode::MostLiked => b.like_count.cmp(&a.like_count),
                SortMode::MostCommented => b.comment_count.cmp(&a.comment_count),
                SortMode::Newest | SortMode::Trending => b.created_at.cmp(&a.created_at),
            }
            .then(b.id.cmp(&a.id))
        });
        if let Some(limit) = filter.limit {
            images.truncate(limit.max(0) as usize);
        }
        Ok(images)
    }

    async fn liked_image_ids(&self, user_id: i64, image_ids: &[i64]) -> Result<HashSet<i64>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .likes
            .iter()
            .filter(|l| l.user_id == user_id && image_ids.contains(&l.image_id))
            .map(|l| l.image_id)
            .collect())
    }

    async fn get_image(&self, image_id: i64) -> Result<Option<GalleryImage>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .images
            .iter()
            .find(|i| i.id == image_id)
            .map(|i| inner.hydrate(i)))
    }

    async fn delete_image(&self, image_id: i64) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.images.len();
        inner.images.retain(|i| i.id != image_id);
        inner.likes.retain(|l| l.image_id != image_id);
        inner.comments.retain(|c| c.image_id != image_id);
        Ok(inner.images.len() < before)
    }

    async fn user_images(&self, user_id: i64) -> Result<Vec<GalleryImage>> {
        let inner = self.inner.lock().unwrap();
        let mut images: Vec<GalleryImage> = inner
            .images
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| inner.hydrate(i))
            .collect();
        images.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(images)
    }

    async fn add_like(&self, user_id: i64, image_id: i64) -> Result<Like> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.image_exists(image_id) {
            return Err(AppError::NotFound(format!("Image {} not found", image_id)));
        }
        if inner
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.image_id == image_id)
        {
            return Err(AppError::Conflict(
                "You have already liked this image".to_string(),
            ));
        }

        let like = StoredLike {
            id: inner.next_id(),
            user_id,
            image_id,
            created_at: Utc::now(),
        };
        inner.likes.push(like.clone());

        Ok(Like {
            id: like.id,
            image_id,
            user_id,
            username: inner.username(user_id),
            created_at: like.created_at,
        })
    }

    async fn remove_like(&self, user_id: i64, image_id: i64) -> Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.likes.len();
        inner
            .likes
            .retain(|l| !(l.user_id == user_id && l.image_id == image_id));
        Ok(inner.likes.len() < before)
    }

    async fn like_count(&self, image_id: i64) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.likes.iter().filter(|l| l.image_id == image_id).count() as i64)
    }

    async fn add_comment(&self, user_id: i64, image_id: i64, comment: &str) -> Result<Comment> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.image_exists(image_id) {
            return Err(AppError::NotFound(format!("Image {} not found", image_id)));
        }

        let comment = Comment {
            id: inner.next_id(),
            image_id,
            user_id,
            username: inner.username(user_id),
            profile_picture: None,
            comment: comment.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, image_id: i64) -> Result<Vec<Comment>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.image_id == image_id)
            .cloned()
            .collect())
    }
}

/// Application wired like `main`, backed by `store`
pub fn app(
    store: Arc<dyn ImageStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = web::Data::new(AppState::new(store, FeedConfig::default()));
    let keys = Arc::new(JwtKeys::from_secret(TEST_SECRET));

    App::new()
        .app_data(state)
        .wrap(JwtAuthMiddleware::new(keys))
        .configure(handlers::configure)
}

pub fn token_with_role(user_id: i64, role: Option<&str>) -> String {
    let claims = Claims {
        user_id,
        username: Some(format!("user{}", user_id)),
        role: role.map(String::from),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encode test token")
}

pub fn token(user_id: i64) -> String {
    token_with_role(user_id, None)
}

pub fn bearer(user_id: i64) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(user_id)))
}
