/// Configuration management for Gallery Service
///
/// Loads configuration from environment variables (and `.env` via dotenvy in main).
/// Database pool settings are read by `db_pool::DbConfig::from_env`.
use anyhow::{Context, Result};
use db_pool::env_utils::parse_env_with_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub feed: FeedConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS (comma separated in `CORS_ALLOWED_ORIGINS`)
    pub cors_allowed_origins: Vec<String>,
}

/// JWT verification settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity collaborator that issues tokens
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

/// Feed paging limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Page size when the request has no `limit`
    pub default_page_size: i64,
    /// Larger `limit` values are clamped to this
    pub max_page_size: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_env_with_default("PORT", 3000),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001".to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        };

        let auth = AuthConfig {
            jwt_secret: std::env::var("JWT_SECRET")
                .context("JWT_SECRET environment variable not set")?,
        };
        if auth.jwt_secret.len() < 16 {
            anyhow::bail!("JWT_SECRET must be at least 16 characters");
        }

        let defaults = FeedConfig::default();
        let feed = FeedConfig {
            default_page_size: parse_env_with_default(
                "FEED_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            ),
            max_page_size: parse_env_with_default("FEED_MAX_PAGE_SIZE", defaults.max_page_size),
        };
        if feed.default_page_size <= 0 || feed.max_page_size < feed.default_page_size {
            anyhow::bail!(
                "Invalid feed paging: default={} max={}",
                feed.default_page_size,
                feed.max_page_size
            );
        }

        Ok(Config {
            app,
            auth,
            feed,
        })
    }
}
