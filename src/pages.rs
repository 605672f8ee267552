//! Server-rendered HTML for the authentication pages and the dashboard.

use crate::auth::AuthForm;
use crate::models::User;

/// Values echoed back into a form after a failed submission.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormState<'a> {
    pub error: Option<&'a str>,
    pub email: &'a str,
    pub username: &'a str,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} · skygate</title>\n</head>\n\
         <body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
        body = body
    )
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|msg| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(msg)))
        .unwrap_or_default()
}

const PASSWORD_FIELD: &str = "<label>Password \
    <input type=\"password\" name=\"password\" minlength=\"8\" required></label>\n";

pub fn auth_form(form: AuthForm, state: &FormState<'_>) -> String {
    let email = format!(
        "<label>Email <input type=\"email\" name=\"email\" value=\"{}\" required></label>\n",
        escape(state.email)
    );
    let error = error_banner(state.error);

    let (title, body) = match form {
        AuthForm::SignIn => (
            "Sign in",
            format!(
                "<h1>Sign in</h1>\n{error}\
                 <form method=\"post\" action=\"/auth/signin\">\n{email}{password}\
                 <button type=\"submit\">Sign in</button>\n</form>\n\
                 <p><a href=\"/auth/signup\">Create an account</a> · \
                 <a href=\"/auth/reset-password\">Forgot your password?</a></p>",
                error = error,
                email = email,
                password = PASSWORD_FIELD
            ),
        ),
        AuthForm::SignUp => (
            "Sign up",
            format!(
                "<h1>Create an account</h1>\n{error}\
                 <form method=\"post\" action=\"/auth/signup\">\n\
                 <label>Username <input type=\"text\" name=\"username\" value=\"{username}\" \
                 minlength=\"3\" maxlength=\"32\" required></label>\n{email}{password}\
                 <button type=\"submit\">Sign up</button>\n</form>\n\
                 <p>Already registered? <a href=\"/auth/signin\">Sign in</a></p>",
                error = error,
                username = escape(state.username),
                email = email,
                password = PASSWORD_FIELD
            ),
        ),
        AuthForm::ResetPassword => (
            "Reset password",
            format!(
                "<h1>Reset your password</h1>\n{error}\
                 <form method=\"post\" action=\"/auth/reset-password\">\n\
                 {email}<button type=\"submit\">Send reset link</button>\n</form>\n\
                 <p><a href=\"/auth/signin\">Back to sign in</a></p>",
                error = error,
                email = email
            ),
        ),
    };

    layout(title, &body)
}

/// Shown after a reset request, whether or not the address has an account.
pub fn reset_requested(email: &str) -> String {
    let body = format!(
        "<h1>Check your inbox</h1>\n\
         <p>If an account exists for <strong>{}</strong>, a reset link is on its way.</p>\n\
         <p><a href=\"/auth/signin\">Back to sign in</a></p>",
        escape(email)
    );
    layout("Reset password", &body)
}

pub fn dashboard(user: &User) -> String {
    let body = format!(
        "<h1>Dashboard</h1>\n<p>Signed in as <strong>{username}</strong> ({email}).</p>\n\
         <p>Fetch moderated content with <code>GET /api/content?actor=&lt;handle&gt;</code> \
         or <code>GET /api/content?mode=thread&amp;uri=&lt;at-uri&gt;</code>.</p>\n\
         <form method=\"post\" action=\"/auth/signout\">\n\
         <button type=\"submit\">Sign out</button>\n</form>",
        username = escape(&user.username),
        email = escape(&user.email)
    );
    layout("Dashboard", &body)
}
