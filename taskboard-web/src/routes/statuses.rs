/// Workflow status management
///
/// The status list is public; mutations require a signed-in user. Create
/// is idempotent by name so re-submitting the form doesn't pile up
/// duplicate reference rows.

use crate::{
    app::AppState,
    error::{AppError, AppResult, FieldError},
    forms::FormData,
    routes::{json_page, redirect_with_flash},
};
use axum::{
    extract::{Path, RawForm, State},
    http::HeaderMap,
    response::Response,
};
use serde_json::json;
use taskboard_shared::auth::session::CurrentUser;
use taskboard_shared::http::flash::Flash;
use taskboard_shared::models::status::{CreateStatus, Status};

fn blank_name() -> AppError {
    AppError::Validation(vec![FieldError::new("name", "Name can't be blank")])
}

/// GET /statuses - list all statuses
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let statuses = Status::list(&state.db).await?;
    Ok(json_page(json!({ "statuses": statuses }), &headers))
}

/// POST /statuses - create a status
pub async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let form = FormData::parse(&body)?;
    let name = form.trimmed("name");
    if name.is_empty() {
        return Err(blank_name());
    }

    if Status::find_by_name(&state.db, &name).await?.is_none() {
        Status::create(&state.db, CreateStatus { name }).await?;
    }

    Ok(redirect_with_flash(
        "/statuses",
        Flash::info("Status created successfully"),
    ))
}

/// PATCH /statuses/:id - rename a status
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let form = FormData::parse(&body)?;
    let name = form.trimmed("name");
    if name.is_empty() {
        return Err(blank_name());
    }

    Status::update(&state.db, id, name)
        .await?
        .ok_or_else(|| AppError::NotFound("Status not found".to_string()))?;

    Ok(redirect_with_flash(
        "/statuses",
        Flash::info("Status updated successfully"),
    ))
}

/// DELETE /statuses/:id - delete a status
///
/// Refused while any task still carries the status.
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
) -> AppResult<Response> {
    if Status::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Status not found".to_string()));
    }

    let deleted = Status::delete(&state.db, id).await?;
    if !deleted {
        return Ok(redirect_with_flash(
            "/statuses",
            Flash::danger("Cannot delete status with assigned tasks"),
        ));
    }

    Ok(redirect_with_flash(
        "/statuses",
        Flash::info("Status deleted successfully"),
    ))
}
