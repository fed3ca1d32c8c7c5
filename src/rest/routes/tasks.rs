// rest/routes/tasks.rs — Task CRUD routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::rest::error::ApiError;
use crate::storage::TaskRow;
use crate::AppContext;

/// GET /api/tasks — all tasks, newest first.
pub async fn list_tasks(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Vec<TaskRow>>, ApiError> {
    let tasks = ctx
        .storage
        .list_tasks()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(tasks))
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub task: String,
}

/// POST /api/tasks — create a task.
///
/// Blank text is rejected here rather than left to client-side trimming.
pub async fn create_task(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskRow>), ApiError> {
    if body.task.trim().is_empty() {
        return Err(ApiError::Create(
            StatusCode::BAD_REQUEST,
            "task must not be empty".to_string(),
        ));
    }

    let row = ctx.storage.create_task(&body.task).await.map_err(|e| {
        tracing::error!(err = %e, "task insert failed");
        ApiError::Create(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to add task".to_string(),
        )
    })?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub completed: bool,
}

/// PUT /api/tasks/{id} — set a task's completion state.
///
/// An id that matches no task is a 404, not a silent success.
pub async fn update_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<TaskRow>, ApiError> {
    Uuid::parse_str(&id).map_err(|e| ApiError::Client(format!("invalid task id '{id}': {e}")))?;

    match ctx.storage.set_completed(&id, body.completed).await {
        Ok(Some(row)) => Ok(Json(row)),
        Ok(None) => Err(ApiError::NotFound(format!("no task with id '{id}'"))),
        Err(e) => Err(ApiError::Client(e.to_string())),
    }
}

/// DELETE /api/tasks/{id} — remove a task.
///
/// Absence of a match is not distinguished from success.
pub async fn delete_task(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ctx.storage
        .delete_task(&id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(json!({ "message": "Task deleted" })))
}
