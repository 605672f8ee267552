use crate::{
    auth::{accounts, generate_token, AuthResponse, LoginRequest, RegisterRequest, SessionConfig},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;

/// Register a new user
///
/// Creates a new account and returns a session token, which is also set as the session
/// cookie so browser clients are signed in immediately.
///
/// ## Responses:
/// - `201 Created`: `AuthResponse` JSON.
/// - `400 Bad Request`: the email is already registered, or the body is malformed.
/// - `422 Unprocessable Entity`: field validation failed.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<SessionConfig>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = accounts::register(&pool, &register_data).await?;
    let token = generate_token(user_id, &config.jwt_secret)?;

    Ok(HttpResponse::Created()
        .cookie(config.session_cookie(&token))
        .json(AuthResponse { token, user_id }))
}

/// Login user
///
/// Authenticates a user and returns a session token (also set as the session cookie).
///
/// ## Responses:
/// - `200 OK`: `AuthResponse` JSON.
/// - `401 Unauthorized`: unknown email or wrong password.
/// - `422 Unprocessable Entity`: field validation failed.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<SessionConfig>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user_id = accounts::authenticate(&pool, &login_data).await?;
    let token = generate_token(user_id, &config.jwt_secret)?;

    Ok(HttpResponse::Ok()
        .cookie(config.session_cookie(&token))
        .json(AuthResponse { token, user_id }))
}
