/// Label management
///
/// Same shape as statuses: public list, authenticated mutations, and a
/// delete that is refused while any task still carries the label.

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
use taskboard_shared::models::label::{CreateLabel, Label};

fn blank_name() -> AppError {
    AppError::Validation(vec![FieldError::new("name", "Name can't be blank")])
}

/// GET /labels - list all labels
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    let labels = Label::list(&state.db).await?;
    Ok(json_page(json!({ "labels": labels }), &headers))
}

/// POST /labels - create a label (idempotent by name)
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

    if Label::find_by_name(&state.db, &name).await?.is_none() {
        Label::create(&state.db, CreateLabel { name }).await?;
    }

    Ok(redirect_with_flash(
        "/labels",
        Flash::info("Label created successfully"),
    ))
}

/// PATCH /labels/:id - rename a label
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

    Label::update(&state.db, id, name)
        .await?
        .ok_or_else(|| AppError::NotFound("Label not found".to_string()))?;

    Ok(redirect_with_flash(
        "/labels",
        Flash::info("Label updated successfully"),
    ))
}

/// DELETE /labels/:id - delete a label
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
) -> AppResult<Response> {
    if Label::find_by_id(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound("Label not found".to_string()));
    }

    let deleted = Label::delete(&state.db, id).await?;
    if !deleted {
        return Ok(redirect_with_flash(
            "/labels",
            Flash::danger("Cannot delete label with assigned tasks"),
        ));
    }

    Ok(redirect_with_flash(
        "/labels",
        Flash::info("Label deleted successfully"),
    ))
}
