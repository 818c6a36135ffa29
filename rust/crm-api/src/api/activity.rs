//! Communication and follow-up endpoints.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use crate::database::accessors::apply_patch;
use crate::domain::{Communication, CommunicationKind, FollowUp, FollowUpKind, FollowUpWithClient};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communications", get(list).post(create))
        .route(
            "/communications/{id}",
            axum::routing::patch(update).delete(remove),
        )
        .route("/follow-ups", get(list_follow_ups).post(create_follow_up))
        .route(
            "/follow-ups/{id}",
            axum::routing::patch(update_follow_up).delete(remove_follow_up),
        )
}

#[derive(Debug, Deserialize)]
struct NewCommunication {
    #[serde(default)]
    client_id: Option<Uuid>,
    #[serde(rename = "type")]
    kind: CommunicationKind,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    duration_minutes: Option<i32>,
    #[serde(default)]
    participants: Option<Vec<String>>,
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Communication>>, ApiError> {
    Ok(Json(
        state.accessors.list::<Communication>(&user.user_id).await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewCommunication>,
) -> Result<Json<Communication>, ApiError> {
    let now = Utc::now();
    let communication = Communication {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        client_id: payload.client_id,
        kind: payload.kind,
        subject: payload.subject,
        content: payload.content,
        scheduled_at: payload.scheduled_at,
        completed_at: None,
        duration_minutes: payload.duration_minutes,
        participants: payload.participants,
        created_at: now,
        updated_at: now,
    };
    state.accessors.insert(&communication).await?;
    Ok(Json(communication))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Communication>, ApiError> {
    let existing: Communication = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut updated: Communication =
        apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
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
    if !state
        .accessors
        .delete::<Communication>(&user.user_id, id)
        .await?
    {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
struct NewFollowUp {
    #[serde(default)]
    client_id: Option<Uuid>,
    #[serde(rename = "type", default = "default_follow_up_kind")]
    kind: FollowUpKind,
    title: String,
    #[serde(default)]
    description: Option<String>,
    scheduled_for: DateTime<Utc>,
    #[serde(default)]
    ai_suggested: bool,
}

fn default_follow_up_kind() -> FollowUpKind {
    FollowUpKind::Reminder
}

async fn list_follow_ups(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<FollowUpWithClient>>, ApiError> {
    Ok(Json(
        state
            .accessors
            .list_follow_ups_with_client(&user.user_id)
            .await?,
    ))
}

async fn create_follow_up(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewFollowUp>,
) -> Result<Json<FollowUp>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }

    let follow_up = FollowUp {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        client_id: payload.client_id,
        kind: payload.kind,
        title: payload.title,
        description: payload.description,
        scheduled_for: payload.scheduled_for,
        completed_at: None,
        ai_suggested: payload.ai_suggested,
        created_at: Utc::now(),
    };
    state.accessors.insert(&follow_up).await?;
    Ok(Json(follow_up))
}

async fn update_follow_up(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<FollowUp>, ApiError> {
    let existing: FollowUp = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let updated: FollowUp = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
    if !state.accessors.replace(&updated).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(updated))
}

async fn remove_follow_up(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.accessors.delete::<FollowUp>(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
