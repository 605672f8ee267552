use std::env;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_PUBLIC_API_URL: &str = "https://public.api.bsky.app";
pub const DEFAULT_WEB_URL: &str = "https://bsky.app";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_port: u16,
    pub server_host: String,
    /// Base URL of the unauthenticated Bluesky AppView.
    pub bsky_public_api_url: String,
    /// Base URL used when building display links to posts and profiles.
    pub bsky_web_url: String,
    /// Remote moderation endpoint. Local rule-based moderation is used when unset.
    pub moderation_api_url: Option<String>,
    pub muted_words: Vec<String>,
    pub request_timeout: Duration,
    pub session_cookie_secure: bool,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are required; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            bsky_public_api_url: env::var("BSKY_PUBLIC_API_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_API_URL.to_string()),
            bsky_web_url: env::var("BSKY_WEB_URL").unwrap_or_else(|_| DEFAULT_WEB_URL.to_string()),
            moderation_api_url: env::var("MODERATION_API_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            muted_words: env::var("MODERATION_MUTED_WORDS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 10)?),
            session_cookie_secure: parsed("SESSION_COOKIE_SECURE", false)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} has an invalid value", key))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}
