//! Server-rendered authentication pages and the dashboard.
//!
//! Each page resolves the session first and runs its guard before doing anything else;
//! a redirect ends the request.

use actix_web::http::{header, StatusCode};
use actix_web::{get, http::header::ContentType, post, web, HttpResponse};
use sqlx::PgPool;

use crate::auth::gate::{see_other, DASHBOARD_PATH, SIGN_IN_PATH};
use crate::auth::{
    accounts, generate_token, guard, require_user, resolve_session, AuthForm, GateOutcome,
    LoginRequest, Protected, RegisterRequest, ResetPasswordRequest, Session, SessionConfig,
    SessionProvider, SessionToken,
};
use validator::Validate;
use crate::error::AppError;
use crate::pages::{self, FormState};

const SIGN_UP_HINT: &str = "Use a 3-32 character username (letters, digits, '_' or '-'), \
    a valid email and a password of at least 8 characters.";

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

async fn current_session(
    sessions: &web::Data<dyn SessionProvider>,
    token: &SessionToken,
) -> Session {
    resolve_session(sessions.get_ref(), token.as_deref()).await
}

async fn guarded_form(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
    form: AuthForm,
) -> HttpResponse {
    let session = current_session(&sessions, &token).await;
    match guard(&session, form) {
        GateOutcome::Redirect(location) => see_other(location),
        GateOutcome::Render(form) => {
            html(StatusCode::OK, pages::auth_form(form, &FormState::default()))
        }
    }
}

/// Issues a session for `user_id` and sends the browser to the dashboard.
fn signed_in_redirect(user_id: i32, config: &SessionConfig) -> Result<HttpResponse, AppError> {
    let token = generate_token(user_id, &config.jwt_secret)?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, DASHBOARD_PATH))
        .cookie(config.session_cookie(&token))
        .finish())
}

#[get("/auth/signin")]
pub async fn sign_in_page(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
) -> HttpResponse {
    guarded_form(sessions, token, AuthForm::SignIn).await
}

#[get("/auth/signup")]
pub async fn sign_up_page(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
) -> HttpResponse {
    guarded_form(sessions, token, AuthForm::SignUp).await
}

#[get("/auth/reset-password")]
pub async fn reset_password_page(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
) -> HttpResponse {
    guarded_form(sessions, token, AuthForm::ResetPassword).await
}

/// Accepts a reset request and always answers with the same confirmation, so the page
/// never reveals whether an address is registered. No email is sent from here.
#[post("/auth/reset-password")]
pub async fn reset_password(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
    form: web::Form<ResetPasswordRequest>,
) -> HttpResponse {
    let session = current_session(&sessions, &token).await;
    if let GateOutcome::Redirect(location) = guard(&session, AuthForm::ResetPassword) {
        return see_other(location);
    }

    if form.validate().is_err() {
        let state = FormState {
            error: Some("Enter a valid email address."),
            email: &form.email,
            ..FormState::default()
        };
        return html(
            StatusCode::UNPROCESSABLE_ENTITY,
            pages::auth_form(AuthForm::ResetPassword, &state),
        );
    }

    log::info!("Password reset requested");
    html(StatusCode::OK, pages::reset_requested(&form.email))
}

#[post("/auth/signin")]
pub async fn sign_in(
    pool: web::Data<PgPool>,
    sessions: web::Data<dyn SessionProvider>,
    config: web::Data<SessionConfig>,
    token: SessionToken,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = current_session(&sessions, &token).await;
    if let GateOutcome::Redirect(location) = guard(&session, AuthForm::SignIn) {
        return Ok(see_other(location));
    }

    match accounts::authenticate(&pool, &form).await {
        Ok(user_id) => signed_in_redirect(user_id, &config),
        Err(AppError::Unauthorized(_)) | Err(AppError::ValidationError(_)) => {
            let state = FormState {
                error: Some("Invalid email or password."),
                email: &form.email,
                ..FormState::default()
            };
            Ok(html(
                StatusCode::UNAUTHORIZED,
                pages::auth_form(AuthForm::SignIn, &state),
            ))
        }
        Err(other) => Err(other),
    }
}

#[post("/auth/signup")]
pub async fn sign_up(
    pool: web::Data<PgPool>,
    sessions: web::Data<dyn SessionProvider>,
    config: web::Data<SessionConfig>,
    token: SessionToken,
    form: web::Form<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let session = current_session(&sessions, &token).await;
    if let GateOutcome::Redirect(location) = guard(&session, AuthForm::SignUp) {
        return Ok(see_other(location));
    }

    let (status, error) = match accounts::register(&pool, &form).await {
        Ok(user_id) => return signed_in_redirect(user_id, &config),
        Err(AppError::ValidationError(_)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            SIGN_UP_HINT.to_string(),
        ),
        Err(AppError::BadRequest(msg)) => (StatusCode::BAD_REQUEST, msg),
        Err(other) => return Err(other),
    };

    let state = FormState {
        error: Some(&error),
        email: &form.email,
        username: &form.username,
    };
    Ok(html(status, pages::auth_form(AuthForm::SignUp, &state)))
}

#[post("/auth/signout")]
pub async fn sign_out(config: web::Data<SessionConfig>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, SIGN_IN_PATH))
        .cookie(config.cleared_cookie())
        .finish()
}

#[get("/dashboard")]
pub async fn dashboard(
    sessions: web::Data<dyn SessionProvider>,
    token: SessionToken,
) -> HttpResponse {
    let session = current_session(&sessions, &token).await;
    match require_user(&session) {
        Protected::Redirect(location) => see_other(location),
        Protected::Allow(user) => html(StatusCode::OK, pages::dashboard(user)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::SESSION_COOKIE;
    use crate::models::User;
    use actix_web::cookie::Cookie;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Arc;

    /// Knows a single token, "good", belonging to carol.
    struct OneUser;

    #[async_trait]
    impl SessionProvider for OneUser {
        async fn current_user(&self, token: &str) -> Result<Option<User>, AppError> {
            Ok((token == "good").then(|| User {
                id: 5,
                username: "carol".into(),
                email: "carol@example.com".into(),
                created_at: Utc::now(),
            }))
        }
    }

    fn sessions() -> web::Data<dyn SessionProvider> {
        let provider: Arc<dyn SessionProvider> = Arc::new(OneUser);
        web::Data::from(provider)
    }

    #[actix_rt::test]
    async fn test_stale_cookie_renders_form() {
        let app = test::init_service(App::new().app_data(sessions()).service(sign_in_page)).await;

        let req = test::TestRequest::get()
            .uri("/auth/signin")
            .cookie(Cookie::new(SESSION_COOKIE, "expired"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("<h1>Sign in</h1>"));
    }

    #[actix_rt::test]
    async fn test_sign_out_clears_cookie() {
        let config = web::Data::new(SessionConfig {
            jwt_secret: "secret".into(),
            cookie_secure: false,
        });
        let app = test::init_service(App::new().app_data(config).service(sign_out)).await;

        let req = test::TestRequest::post().uri("/auth/signout").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), SIGN_IN_PATH);
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .expect("session cookie should be cleared");
        assert_eq!(cookie.value(), "");
    }

    #[actix_rt::test]
    async fn test_signed_in_form_post_redirects_without_touching_database() {
        // The pool points at a closed port, so any query would fail.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://unused@127.0.0.1:1/none")
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(sessions())
                .app_data(web::Data::new(pool))
                .app_data(web::Data::new(SessionConfig {
                    jwt_secret: "secret".into(),
                    cookie_secure: false,
                }))
                .service(sign_in),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/signin")
            .cookie(Cookie::new(SESSION_COOKIE, "good"))
            .set_form([("email", "carol@example.com"), ("password", "irrelevant-pw")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), DASHBOARD_PATH);
    }

    #[actix_rt::test]
    async fn test_reset_request_gets_neutral_confirmation() {
        let app = test::init_service(
            App::new()
                .app_data(sessions())
                .configure(crate::routes::page_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/reset-password")
            .set_form([("email", "nobody@example.com")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("If an account exists"));

        let req = test::TestRequest::post()
            .uri("/auth/reset-password")
            .set_form([("email", "not-an-address")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/auth/reset-password")
            .cookie(Cookie::new(SESSION_COOKIE, "good"))
            .set_form([("email", "carol@example.com")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }

    #[actix_rt::test]
    async fn test_malformed_form_gets_error_body() {
        let app = test::init_service(
            App::new()
                .app_data(sessions())
                .configure(crate::routes::page_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/reset-password")
            .set_form([("address", "carol@example.com")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "bad_request");
    }
}
