use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{NewTodo, Todo, TodoPatch};
use crate::database::TodoStore;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

fn title_required() -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert("title".to_string(), "Title must not be empty".to_string());
    ApiError::validation_error("Missing required fields", Some(field_errors))
}

/// GET /todos - All tasks owned by the caller, newest-created first
pub async fn list(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> ApiResult<Vec<Todo>> {
    let todos = state.todos.find_by_owner(user.id).await?;
    Ok(ApiResponse::success(todos))
}

/// POST /todos - Create a task owned by the caller
pub async fn create(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Json(payload): Json<CreateTodoRequest>,
) -> ApiResult<Todo> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(title_required)?;

    let todo = state
        .todos
        .insert(
            user.id,
            NewTodo {
                title: title.to_string(),
                description: payload.description,
                completed: payload.completed,
            },
        )
        .await?;

    Ok(ApiResponse::created(todo))
}

/// GET /todos/:id - A single task, if owned by the caller
pub async fn get(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Todo> {
    let todo = state
        .todos
        .find_one_by_id_and_owner(id, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    Ok(ApiResponse::success(todo))
}

/// PUT /todos/:id - Merge the supplied fields into a task
///
/// Absent or not-owned ids are indistinguishable in the response; the
/// owner filter sits inside the store query, so the record is never read
/// before the ownership check.
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTodoRequest>,
) -> ApiResult<Todo> {
    let title = match payload.title {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(title_required());
            }
            Some(trimmed.to_string())
        }
        None => None,
    };

    let patch = TodoPatch {
        title,
        description: payload.description,
        completed: payload.completed,
    };

    let todo = state
        .todos
        .update_by_id_and_owner(id, user.id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;

    Ok(ApiResponse::success(todo))
}

/// DELETE /todos/:id - Remove a task owned by the caller
pub async fn remove(
    Extension(user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let deleted = state.todos.delete_by_id_and_owner(id, user.id).await?;

    if !deleted {
        return Err(ApiError::not_found("Todo not found"));
    }

    Ok(ApiResponse::success(
        json!({ "message": "Todo deleted successfully" }),
    ))
}
