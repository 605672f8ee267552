use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewUser, User, UserCredentials};

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserCredentials>, AppError> {
    let credentials = sqlx::query_as::<_, UserCredentials>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(credentials)
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Inserts a new account and returns its id.
pub async fn insert(pool: &PgPool, user: NewUser<'_>) -> Result<i32, AppError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.password_hash)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
