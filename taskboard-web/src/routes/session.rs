/// Login and logout
///
/// Sign-in checks the submitted credentials against the stored Argon2id
/// digest and, on success, sets the signed session cookie. A wrong email
/// and a wrong password answer identically so the form can't be used to
/// probe which addresses are registered.

use crate::{
    app::AppState,
    error::{AppError, AppResult, FieldError},
    forms::FormData,
    routes::{append_cookie, json_page, redirect_with_flash},
};
use axum::{
    extract::{RawForm, State},
    http::HeaderMap,
    response::Response,
};
use serde_json::json;
use taskboard_shared::auth::{password, session};
use taskboard_shared::http::flash::Flash;

fn invalid_credentials() -> AppError {
    AppError::Validation(vec![FieldError::new("email", "Invalid email or password")])
}

/// GET /session/new - the login form page
pub async fn new_form(headers: HeaderMap) -> Response {
    json_page(json!({ "page": "session/new" }), &headers)
}

/// POST /session - sign in
pub async fn create(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let form = FormData::parse(&body)?;
    let email = form.trimmed("email");
    let submitted = form.field("password").unwrap_or_default().to_string();

    let user = taskboard_shared::models::user::User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let valid = password::verify_password(&submitted, &user.password_digest).unwrap_or(false);
    if !valid {
        return Err(invalid_credentials());
    }

    tracing::info!(user_id = user.id, "User signed in");

    let token = session::issue_token(user.id, state.session_secret());
    let mut response = redirect_with_flash("/", Flash::success("You are logged in"));
    append_cookie(&mut response, &session::session_cookie(&token));
    Ok(response)
}

/// DELETE /session (and POST /session/delete) - sign out
pub async fn destroy() -> Response {
    let mut response = redirect_with_flash("/", Flash::info("You are logged out"));
    append_cookie(&mut response, &session::clear_session_cookie());
    response
}
