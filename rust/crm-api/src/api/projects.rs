//! Project and task endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use crate::database::accessors::apply_patch;
use crate::domain::{Project, ProjectStatus, Task, TaskPriority, TaskStatus, TaskWithRelations};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list).post(create))
        .route(
            "/projects/{id}",
            axum::routing::patch(update).delete(remove),
        )
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            axum::routing::patch(update_task).delete(remove_task),
        )
}

#[derive(Debug, Deserialize)]
struct NewProject {
    #[serde(default)]
    client_id: Option<Uuid>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_project_status")]
    status: ProjectStatus,
    #[serde(default)]
    progress: Option<i32>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
}

fn default_project_status() -> ProjectStatus {
    ProjectStatus::InProgress
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.accessors.list::<Project>(&user.user_id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewProject>,
) -> Result<Json<Project>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        client_id: payload.client_id,
        title: payload.title,
        description: payload.description,
        status: payload.status,
        progress: payload.progress,
        category: payload.category,
        tags: payload.tags,
        start_date: payload.start_date,
        due_date: payload.due_date,
        created_at: now,
        updated_at: now,
    };
    state.accessors.insert(&project).await?;
    Ok(Json(project))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Project>, ApiError> {
    let existing: Project = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut updated: Project = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
    updated.updated_at = Utc::now();
    if !state.accessors.replace(&updated).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.accessors.delete::<Project>(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
struct NewTask {
    #[serde(default)]
    project_id: Option<Uuid>,
    #[serde(default)]
    client_id: Option<Uuid>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_task_status")]
    status: TaskStatus,
    #[serde(default)]
    priority: Option<TaskPriority>,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    assigned_to: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

fn default_task_status() -> TaskStatus {
    TaskStatus::New
}

async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<TaskWithRelations>>, ApiError> {
    Ok(Json(
        state
            .accessors
            .list_tasks_with_relations(&user.user_id)
            .await?,
    ))
}

async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewTask>,
) -> Result<Json<Task>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }

    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        project_id: payload.project_id,
        client_id: payload.client_id,
        title: payload.title,
        description: payload.description,
        status: payload.status,
        priority: payload.priority,
        due_date: payload.due_date,
        assigned_to: payload.assigned_to,
        tags: payload.tags,
        created_at: now,
        updated_at: now,
    };
    state.accessors.insert(&task).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Task>, ApiError> {
    let existing: Task = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut updated: Task = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
    updated.updated_at = Utc::now();
    if !state.accessors.replace(&updated).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(updated))
}

async fn remove_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.accessors.delete::<Task>(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
