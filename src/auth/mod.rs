pub mod accounts;
pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::{AuthenticatedUserId, SessionToken};
pub use gate::{guard, require_user, AuthForm, GateOutcome, Protected};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use session::{
    resolve_session, JwtSessionProvider, Session, SessionConfig, SessionProvider,
};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Sign-in credentials. Accepted both as a JSON body and as a URL-encoded form.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// New account details. Accepted both as a JSON body and as a URL-encoded form.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Between 3 and 32 characters: letters, digits, underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Reset-password form. Only the address is collected; nothing is sent from here.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Response body of the JSON login and register endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Session JWT; the same value is also set as the session cookie.
    pub token: String,
    pub user_id: i32,
}
