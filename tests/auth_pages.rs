use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::Utc;
use dotenv::dotenv;
use serde_json::json;
use skygate::auth::session::SESSION_COOKIE;
use skygate::auth::{AuthMiddleware, JwtSessionProvider, SessionConfig, SessionProvider};
use skygate::models::User;
use skygate::routes;
use skygate::AppError;
use sqlx::PgPool;
use std::sync::Arc;

const PAGES: [(&str, &str); 3] = [
    ("/auth/signin", "<h1>Sign in</h1>"),
    ("/auth/signup", "<h1>Create an account</h1>"),
    ("/auth/reset-password", "<h1>Reset your password</h1>"),
];

/// Session provider with a fixed answer for every token.
enum FakeSessions {
    SignedIn,
    NoUser,
    Broken,
}

#[async_trait]
impl SessionProvider for FakeSessions {
    async fn current_user(&self, _token: &str) -> Result<Option<User>, AppError> {
        match self {
            FakeSessions::SignedIn => Ok(Some(User {
                id: 11,
                username: "dana".into(),
                email: "dana@example.com".into(),
                created_at: Utc::now(),
            })),
            FakeSessions::NoUser => Ok(None),
            FakeSessions::Broken => Err(AppError::AuthLookupFailure("connection reset".into())),
        }
    }
}

fn sessions(fake: FakeSessions) -> web::Data<dyn SessionProvider> {
    let provider: Arc<dyn SessionProvider> = Arc::new(fake);
    web::Data::from(provider)
}

fn page_request(uri: &str) -> actix_http::Request {
    test::TestRequest::get()
        .uri(uri)
        .cookie(Cookie::new(SESSION_COOKIE, "some-token"))
        .to_request()
}

#[test_log::test(actix_rt::test)]
async fn test_signed_in_visitors_are_redirected_to_dashboard() {
    let app = test::init_service(
        App::new()
            .app_data(sessions(FakeSessions::SignedIn))
            .configure(routes::page_config),
    )
    .await;

    for (uri, heading) in PAGES {
        let resp = test::call_service(&app, page_request(uri)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/dashboard",
            "{}",
            uri
        );

        let body = test::read_body(resp).await;
        assert!(
            !String::from_utf8_lossy(&body).contains(heading),
            "{} must not render its form",
            uri
        );
    }
}

#[actix_rt::test]
async fn test_anonymous_visitors_get_each_form() {
    for fake in [FakeSessions::NoUser, FakeSessions::Broken] {
        let app = test::init_service(
            App::new()
                .app_data(sessions(fake))
                .configure(routes::page_config),
        )
        .await;

        for (uri, heading) in PAGES {
            let resp = test::call_service(&app, page_request(uri)).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            assert!(resp.headers().get(header::LOCATION).is_none());

            let body = test::read_body(resp).await;
            assert!(String::from_utf8_lossy(&body).contains(heading), "{}", uri);
        }
    }
}

#[actix_rt::test]
async fn test_requests_without_token_render_forms() {
    // Even a provider that would say "signed in" is never asked without a token.
    let app = test::init_service(
        App::new()
            .app_data(sessions(FakeSessions::SignedIn))
            .configure(routes::page_config),
    )
    .await;

    let req = test::TestRequest::get().uri("/auth/signup").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_dashboard_guard() {
    let app = test::init_service(
        App::new()
            .app_data(sessions(FakeSessions::NoUser))
            .configure(routes::page_config),
    )
    .await;
    let resp = test::call_service(&app, page_request("/dashboard")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/signin"
    );

    let app = test::init_service(
        App::new()
            .app_data(sessions(FakeSessions::SignedIn))
            .configure(routes::page_config),
    )
    .await;
    let resp = test::call_service(&app, page_request("/dashboard")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("<strong>dana</strong>"));
}

/// Full round trip against a real database: register over the JSON API, then use the
/// issued cookie on the pages.
#[actix_rt::test]
#[ignore = "requires DATABASE_URL pointing at a disposable Postgres database"]
async fn test_register_then_pages_redirect() {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    skygate::db::migrate(&pool).await.expect("migrations");

    let email = "pages_flow@example.com";
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(&pool)
        .await;

    let secret = "integration_secret";
    let provider: Arc<dyn SessionProvider> =
        Arc::new(JwtSessionProvider::new(pool.clone(), secret));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(provider))
            .app_data(web::Data::new(SessionConfig {
                jwt_secret: secret.into(),
                cookie_secure: false,
            }))
            .configure(routes::page_config)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware::new(secret))
                    .configure(routes::api_config),
            ),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "pages_flow", "email": email, "password": "Password123!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("register should set the session cookie")
        .into_owned();

    let req = test::TestRequest::get()
        .uri("/auth/signin")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // Duplicate registration through the HTML form re-renders it with the error.
    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_form([("username", "pages_flow"), ("email", email), ("password", "Password123!")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Wrong password on the sign-in form.
    let req = test::TestRequest::post()
        .uri("/auth/signin")
        .set_form([("email", email), ("password", "WrongPassword1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(&pool)
        .await;
}
