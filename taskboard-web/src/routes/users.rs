/// Registration and account management
///
/// The user list and the registration form are public. Editing or
/// deleting an account is allowed only for that account's owner; anyone
/// else is bounced back to the list with an "Access denied" flash rather
/// than a bare 403, matching the browser flow.

use crate::{
    app::AppState,
    error::{AppError, AppResult, FieldError},
    forms::FormData,
    routes::{append_cookie, json_page, redirect_with_flash},
};
use axum::{
    extract::{Path, RawForm, State},
    http::HeaderMap,
    response::Response,
};
use serde_json::json;
use taskboard_shared::auth::{
    password,
    session::{self, CurrentUser},
};
use taskboard_shared::http::flash::Flash;
use taskboard_shared::models::user::{CreateUser, UpdateUser, User};
use validator::Validate;

/// Registration form fields
#[derive(Debug, Validate)]
struct RegistrationForm {
    #[validate(length(min = 1, message = "First name can't be blank"))]
    first_name: String,

    #[validate(length(min = 1, message = "Last name can't be blank"))]
    last_name: String,

    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 3, message = "Password must be at least 3 characters"))]
    password: String,
}

/// GET /users - list all users
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let users = User::list(&state.db).await?;
    Ok(json_page(json!({ "users": users }), &headers))
}

/// POST /users - register a new account
pub async fn create(State(state): State<AppState>, RawForm(body): RawForm) -> AppResult<Response> {
    let form = FormData::parse(&body)?;

    let registration = RegistrationForm {
        first_name: form.trimmed("firstName"),
        last_name: form.trimmed("lastName"),
        email: form.trimmed("email"),
        password: form.field("password").unwrap_or_default().to_string(),
    };
    registration.validate()?;

    // No unique constraint on email at the schema level, so the duplicate
    // check lives here.
    if User::find_by_email(&state.db, &registration.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(vec![FieldError::new(
            "email",
            "Email already in use",
        )]));
    }

    let password_digest = password::hash_password(&registration.password)?;
    let user = User::create(
        &state.db,
        CreateUser {
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            password_digest,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(redirect_with_flash(
        "/",
        Flash::info("User registered successfully"),
    ))
}

/// PATCH /users/:id - update an account (owner only)
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(current): CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    if current.id != id {
        return Ok(redirect_with_flash("/users", Flash::danger("Access denied")));
    }

    let form = FormData::parse(&body)?;

    let non_empty = |value: String| if value.is_empty() { None } else { Some(value) };

    // Blank fields keep their current values; the password changes only
    // when a new one of acceptable length is submitted.
    let submitted_password = form.field("password").unwrap_or_default();
    let password_digest = if submitted_password.len() >= 3 {
        Some(password::hash_password(submitted_password)?)
    } else {
        None
    };

    let data = UpdateUser {
        first_name: non_empty(form.trimmed("firstName")),
        last_name: non_empty(form.trimmed("lastName")),
        email: non_empty(form.trimmed("email")),
        password_digest,
    };

    User::update(&state.db, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(redirect_with_flash(
        "/users",
        Flash::info("User updated successfully"),
    ))
}

/// DELETE /users/:id - delete an account (owner only)
///
/// Refused while any task still references the user as creator or
/// executor. A successful delete also ends the session.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    CurrentUser(current): CurrentUser,
) -> AppResult<Response> {
    if current.id != id {
        return Ok(redirect_with_flash("/users", Flash::danger("Access denied")));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Ok(redirect_with_flash(
            "/users",
            Flash::danger("Cannot delete user with assigned tasks"),
        ));
    }

    tracing::info!(user_id = id, "User deleted");

    let mut response = redirect_with_flash("/users", Flash::info("User deleted successfully"));
    append_cookie(&mut response, &session::clear_session_cookie());
    Ok(response)
}
