//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! It centralizes error management, providing a consistent way to handle and represent
//! the failures of every collaborator the application composes: the database, the session
//! lookup, the Bluesky feed provider and the moderation service.
//!
//! `AppError` implements `actix_web::error::ResponseError` to convert application errors
//! into HTTP responses with a JSON body of the form `{"error": ..., "kind": ...}`. The
//! `kind` field is stable so API callers can tell a feed failure from a moderation failure
//! without parsing messages.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::bluesky::ProviderError;
use crate::moderation::ModerationError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// The requested resource was not found (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from database operations (HTTP 500).
    DatabaseError(String),
    /// Failed input validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
    /// The session collaborator could not resolve the current user (HTTP 500).
    ///
    /// Pages never surface this; the auth gate treats it as an anonymous visitor.
    AuthLookupFailure(String),
    /// The external content provider failed to deliver content (HTTP 502).
    ProviderFetchFailure(String),
    /// The moderation service could not produce a verdict (HTTP 503).
    ModerationServiceFailure(String),
}

impl AppError {
    /// Stable machine-readable identifier for the error, included in every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::InternalServerError(_) => "internal",
            AppError::DatabaseError(_) => "database",
            AppError::ValidationError(_) => "validation",
            AppError::AuthLookupFailure(_) => "auth_lookup",
            AppError::ProviderFetchFailure(_) => "provider_fetch",
            AppError::ModerationServiceFailure(_) => "moderation_unavailable",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg)
            | AppError::DatabaseError(msg)
            | AppError::ValidationError(msg)
            | AppError::AuthLookupFailure(msg)
            | AppError::ProviderFetchFailure(msg)
            | AppError::ModerationServiceFailure(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::AuthLookupFailure(msg) => write!(f, "Session Lookup Failed: {}", msg),
            AppError::ProviderFetchFailure(msg) => write!(f, "Content Provider Error: {}", msg),
            AppError::ModerationServiceFailure(msg) => {
                write!(f, "Moderation Service Error: {}", msg)
            }
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Database and session failures are presented as generic internal errors.
            AppError::InternalServerError(_)
            | AppError::DatabaseError(_)
            | AppError::AuthLookupFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ProviderFetchFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::ModerationServiceFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.message(),
            "kind": self.kind()
        }))
    }
}

/// `sqlx::Error::RowNotFound` maps to `NotFound`, everything else to `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT processing failures (bad signature, expiry) are authentication failures.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Caller mistakes stay client errors; everything the provider did wrong is a 502.
impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> AppError {
        match error {
            ProviderError::InvalidIdentifier(_) => AppError::BadRequest(error.to_string()),
            ProviderError::NotFound(_) => AppError::NotFound(error.to_string()),
            _ => AppError::ProviderFetchFailure(error.to_string()),
        }
    }
}

impl From<ModerationError> for AppError {
    fn from(error: ModerationError) -> AppError {
        AppError::ModerationServiceFailure(error.to_string())
    }
}
