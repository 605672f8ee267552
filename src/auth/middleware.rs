use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::session::request_token;
use crate::auth::token::verify_token;
use crate::error::AppError;

/// API paths reachable without a session.
const PUBLIC_PATHS: [&str; 2] = ["/api/auth/login", "/api/auth/register"];

/// Rejects API requests that lack a valid session token.
///
/// Accepts the session cookie or an `Authorization: Bearer` header and, on success,
/// stores the user id in the request extensions for `AuthenticatedUserId`.
pub struct AuthMiddleware {
    secret: Rc<str>,
}

impl AuthMiddleware {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Rc::from(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            secret: Rc::clone(&self.secret),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    secret: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.iter().any(|path| req.path().starts_with(path)) {
            return Box::pin(self.service.call(req));
        }

        let Some(token) = request_token(req.request()) else {
            let err = AppError::Unauthorized("Missing session token".into());
            return Box::pin(async move { Err(err.into()) });
        };

        match verify_token(&token, &self.secret) {
            Ok(claims) => {
                req.extensions_mut().insert(claims.sub);
                Box::pin(self.service.call(req))
            }
            Err(err) => {
                log::debug!("Rejected API request to {}: {}", req.path(), err);
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}
