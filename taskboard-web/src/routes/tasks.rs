/// Task routes: the filterable list, CRUD, and label assignment
///
/// The list and individual task pages are public. Creating and editing
/// require a signed-in user; deleting additionally requires being the
/// task's creator.
///
/// # Filter parameters
///
/// `GET /tasks` accepts query parameters straight from the filter form:
///
/// - `statusId`, `executorId`, `labelId`: numeric ids, empty means unset
/// - `onlyMy`, `hasLabel`: checkboxes, truthy as "1", "true" or "on"
///
/// `onlyMy` constrains to tasks the signed-in user created and is ignored
/// for visitors.

use crate::{
    app::AppState,
    error::{AppError, AppResult, FieldError},
    forms::FormData,
    routes::{json_page, redirect_with_flash},
};
use axum::{
    extract::{Path, Query, RawForm, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::auth::session::{CurrentUser, MaybeUser};
use taskboard_shared::http::flash::Flash;
use taskboard_shared::models::task::{CreateTask, Task, TaskFilter, UpdateTask};

/// Raw filter-form query parameters
///
/// Everything arrives as strings; empty selects submit empty values and
/// must read as "no constraint".
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    #[serde(rename = "statusId", alias = "status")]
    status_id: Option<String>,

    #[serde(rename = "executorId", alias = "executor")]
    executor_id: Option<String>,

    #[serde(rename = "labelId", alias = "label")]
    label_id: Option<String>,

    #[serde(rename = "onlyMy", alias = "isCreatorUser")]
    only_my: Option<String>,

    #[serde(rename = "hasLabel")]
    has_label: Option<String>,
}

fn parse_id(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|v| v.trim().parse::<i64>().ok())
}

fn checkbox_on(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true") | Some("on"))
}

/// Reads label ids out of a submitted form
///
/// The multi-select posts `data[labels][]`; older clients post
/// `data[labelIds][]`. Both spellings are accepted.
fn submitted_label_ids(form: &FormData) -> Vec<i64> {
    let ids = form.id_list("labels");
    if ids.is_empty() {
        form.id_list("labelIds")
    } else {
        ids
    }
}

fn labels_field_present(form: &FormData) -> bool {
    form.has_field("labels") || form.has_field("labelIds")
}

/// GET /tasks - list tasks matching the filter form
pub async fn index(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(params): Query<TaskListParams>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let mut filter = TaskFilter {
        status_id: parse_id(&params.status_id),
        executor_id: parse_id(&params.executor_id),
        label_id: parse_id(&params.label_id),
        has_label: checkbox_on(&params.has_label),
        creator_id: None,
    };

    if checkbox_on(&params.only_my) {
        if let Some(user) = &user {
            filter.creator_id = Some(user.id);
        }
    }

    let tasks = Task::list(&state.db, &filter).await?;
    Ok(json_page(json!({ "tasks": tasks }), &headers))
}

/// GET /tasks/:id - a single task with its labels
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(json_page(json!({ "task": task }), &headers))
}

/// POST /tasks - create a task
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let form = FormData::parse(&body)?;

    let name = form.trimmed("name");
    let status_id = form.id_field("statusId");

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name can't be blank"));
    }
    if status_id.is_none() {
        errors.push(FieldError::new("statusId", "Status must be selected"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let description = form
        .field("description")
        .map(str::to_string)
        .filter(|d| !d.is_empty());

    let task = Task::create(
        &state.db,
        CreateTask {
            name,
            description,
            status_id: status_id.unwrap_or_default(),
            creator_id: current.id,
            executor_id: form.id_field("executorId"),
            label_ids: submitted_label_ids(&form),
        },
    )
    .await?;

    tracing::info!(task_id = task.id, creator_id = current.id, "Task created");

    Ok(redirect_with_flash(
        "/tasks",
        Flash::info("Task created successfully"),
    ))
}

/// PATCH /tasks/:id - update a task
///
/// Fields left out of the form keep their values. A submitted label list
/// replaces the whole association set; leaving the field out leaves the
/// labels alone.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    _user: CurrentUser,
    RawForm(body): RawForm,
) -> AppResult<Response> {
    let form = FormData::parse(&body)?;

    let name = form.trimmed("name");
    if form.has_field("name") && name.is_empty() {
        return Err(AppError::Validation(vec![FieldError::new(
            "name",
            "Name can't be blank",
        )]));
    }

    let data = UpdateTask {
        name: if form.has_field("name") { Some(name) } else { None },
        description: if form.has_field("description") {
            Some(
                form.field("description")
                    .map(str::to_string)
                    .filter(|d| !d.is_empty()),
            )
        } else {
            None
        },
        status_id: form.id_field("statusId"),
        executor_id: if form.has_field("executorId") {
            // Empty value clears the assignment
            Some(form.id_field("executorId"))
        } else {
            None
        },
        label_ids: if labels_field_present(&form) {
            Some(submitted_label_ids(&form))
        } else {
            None
        },
    };

    Task::update(&state.db, id, data)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(redirect_with_flash(
        "/tasks",
        Flash::info("Task updated successfully"),
    ))
}

/// DELETE /tasks/:id - delete a task (creator only)
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeUser(user): MaybeUser,
) -> AppResult<Response> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    let is_creator = user.as_ref().map(|u| u.id == task.creator_id).unwrap_or(false);
    if !is_creator {
        return Ok(redirect_with_flash(
            "/tasks",
            Flash::danger("Access denied"),
        ));
    }

    Task::delete(&state.db, id).await?;

    tracing::info!(task_id = id, "Task deleted");

    Ok(redirect_with_flash(
        "/tasks",
        Flash::info("Task deleted successfully"),
    ))
}
