//! Session collaborator.
//!
//! A session is a signed JWT carried either in the [`SESSION_COOKIE`] cookie (browser pages)
//! or in an `Authorization: Bearer` header (API clients). Resolving it yields a [`Session`],
//! which handlers pass explicitly to whatever needs to know who is asking.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::token::{verify_token, TOKEN_TTL_HOURS};
use crate::db;
use crate::error::AppError;
use crate::models::User;

pub const SESSION_COOKIE: &str = "skygate_session";

/// Secrets and flags needed to issue and check session tokens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub jwt_secret: String,
    pub cookie_secure: bool,
}

impl SessionConfig {
    /// Builds the cookie that carries a freshly issued token.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token.to_owned())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(CookieDuration::hours(TOKEN_TTL_HOURS))
            .finish()
    }

    /// Builds a cookie that makes the browser drop its session.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie("");
        cookie.make_removal();
        cookie
    }
}

/// The identity behind a request, resolved once and passed around explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    Authenticated(User),
    Anonymous,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Looks up the user a session token belongs to.
///
/// `Ok(None)` means "no valid session"; `Err` means the lookup itself failed.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self, token: &str) -> Result<Option<User>, AppError>;
}

/// Production session provider: verifies the JWT, then loads the user row.
pub struct JwtSessionProvider {
    pool: PgPool,
    secret: String,
}

impl JwtSessionProvider {
    pub fn new(pool: PgPool, secret: impl Into<String>) -> Self {
        Self {
            pool,
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn current_user(&self, token: &str) -> Result<Option<User>, AppError> {
        let claims = match verify_token(token, &self.secret) {
            Ok(claims) => claims,
            Err(AppError::Unauthorized(reason)) => {
                log::debug!("Ignoring session token: {}", reason);
                return Ok(None);
            }
            Err(other) => return Err(other),
        };

        db::users::find_by_id(&self.pool, claims.sub)
            .await
            .map_err(|e| AppError::AuthLookupFailure(e.to_string()))
    }
}

/// Pulls the session token out of a request: the cookie wins over a bearer header.
pub fn request_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_owned());
        }
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
}

/// Resolves the session for a request token.
///
/// Lookup failures are logged and treated as anonymous, so a broken session store
/// degrades to the sign-in pages instead of an error page.
pub async fn resolve_session(provider: &dyn SessionProvider, token: Option<&str>) -> Session {
    let Some(token) = token else {
        return Session::Anonymous;
    };

    match provider.current_user(token).await {
        Ok(Some(user)) => Session::Authenticated(user),
        Ok(None) => Session::Anonymous,
        Err(e) => {
            log::warn!("Session lookup failed, continuing as anonymous: {}", e);
            Session::Anonymous
        }
    }
}
