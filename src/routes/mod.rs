pub mod auth;
pub mod content;
pub mod health;
pub mod pages;

use actix_web::{web, HttpRequest};

use crate::error::AppError;

/// Extractor failures get the same JSON error body as every other error.
fn payload_error(err: impl std::fmt::Display, req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected payload for {}: {}", req.path(), err);
    AppError::BadRequest(err.to_string()).into()
}

/// Server-rendered pages and their form submissions.
pub fn page_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(|err, req| payload_error(err, req)))
        .service(pages::sign_in_page)
        .service(pages::sign_up_page)
        .service(pages::reset_password_page)
        .service(pages::reset_password)
        .service(pages::sign_in)
        .service(pages::sign_up)
        .service(pages::sign_out)
        .service(pages::dashboard);
}

/// JSON API, mounted under `/api` behind `AuthMiddleware`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, req| payload_error(err, req)))
        .app_data(web::JsonConfig::default().error_handler(|err, req| payload_error(err, req)))
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(content::get_content);
}
