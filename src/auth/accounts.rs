//! Sign-in and sign-up, shared by the HTML form handlers and the JSON API.

use sqlx::PgPool;
use validator::Validate;

use crate::auth::{hash_password, verify_password, LoginRequest, RegisterRequest};
use crate::db;
use crate::error::AppError;
use crate::models::NewUser;

/// Checks credentials and returns the user's id.
///
/// Unknown emails and wrong passwords produce the same error.
pub async fn authenticate(pool: &PgPool, login: &LoginRequest) -> Result<i32, AppError> {
    login.validate()?;

    let credentials = db::users::find_credentials(pool, &login.email).await?;
    match credentials {
        Some(user) if verify_password(&login.password, &user.password_hash)? => {
            log::info!("User {} signed in", user.id);
            Ok(user.id)
        }
        _ => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Creates an account and returns the new user's id.
pub async fn register(pool: &PgPool, request: &RegisterRequest) -> Result<i32, AppError> {
    request.validate()?;

    if db::users::email_exists(pool, &request.email).await? {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&request.password)?;
    let id = db::users::insert(
        pool,
        NewUser {
            username: &request.username,
            email: &request.email,
            password_hash: &password_hash,
        },
    )
    .await?;

    log::info!("Registered user {}", id);
    Ok(id)
}
