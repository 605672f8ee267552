//! Redirect guards for server-rendered pages.
//!
//! Every guard takes an already-resolved [`Session`] and decides between exactly two
//! outcomes. The redirect is terminal: callers return it without running page logic.

use actix_web::{http::header, HttpResponse};

use crate::auth::session::Session;
use crate::models::User;

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const SIGN_IN_PATH: &str = "/auth/signin";

/// The unauthenticated entry forms guarded by [`guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    SignIn,
    SignUp,
    ResetPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The visitor is signed in; send them to the given location.
    Redirect(&'static str),
    /// The visitor is anonymous; render the form.
    Render(AuthForm),
}

/// Guard for the sign-in, sign-up and reset-password pages.
pub fn guard(session: &Session, form: AuthForm) -> GateOutcome {
    if session.is_authenticated() {
        GateOutcome::Redirect(DASHBOARD_PATH)
    } else {
        GateOutcome::Render(form)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Protected<'a> {
    Redirect(&'static str),
    Allow(&'a User),
}

/// Inverse guard for pages that need a signed-in user.
pub fn require_user(session: &Session) -> Protected<'_> {
    match session.user() {
        Some(user) => Protected::Allow(user),
        None => Protected::Redirect(SIGN_IN_PATH),
    }
}

/// `303 See Other`, so a redirected form POST is followed with a GET.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
