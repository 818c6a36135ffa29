//! Deal and pipeline stage endpoints.

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
use crate::domain::{Deal, DealStatus, DealWithRelations, PipelineStage};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deals", get(list).post(create))
        .route("/deals/{id}", axum::routing::patch(update).delete(remove))
        .route("/pipeline-stages", get(list_stages).post(create_stage))
        .route(
            "/pipeline-stages/{id}",
            axum::routing::patch(update_stage).delete(remove_stage),
        )
}

#[derive(Debug, Deserialize)]
struct NewDeal {
    #[serde(default)]
    client_id: Option<Uuid>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    #[serde(default)]
    stage_id: Option<Uuid>,
    #[serde(default)]
    probability: Option<i32>,
    #[serde(default = "default_status")]
    status: DealStatus,
    #[serde(default)]
    expected_close_date: Option<NaiveDate>,
}

fn default_status() -> DealStatus {
    DealStatus::Active
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<DealWithRelations>>, ApiError> {
    Ok(Json(
        state
            .accessors
            .list_deals_with_relations(&user.user_id)
            .await?,
    ))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewDeal>,
) -> Result<Json<Deal>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }
    if payload
        .probability
        .is_some_and(|p| !(0..=100).contains(&p))
    {
        return Err(ApiError::InvalidRequest(
            "probability must be between 0 and 100".to_string(),
        ));
    }

    let now = Utc::now();
    let deal = Deal {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        client_id: payload.client_id,
        title: payload.title,
        description: payload.description,
        value: payload.value,
        stage_id: payload.stage_id,
        probability: payload.probability,
        status: payload.status,
        expected_close_date: payload.expected_close_date,
        actual_close_date: None,
        created_at: now,
        updated_at: now,
    };
    state.accessors.insert(&deal).await?;
    Ok(Json(deal))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Deal>, ApiError> {
    let existing: Deal = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut updated: Deal = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
    if updated.probability.is_some_and(|p| !(0..=100).contains(&p)) {
        return Err(ApiError::InvalidRequest(
            "probability must be between 0 and 100".to_string(),
        ));
    }
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
    if !state.accessors.delete::<Deal>(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
struct NewStage {
    name: String,
    order_index: i32,
    #[serde(default)]
    color: Option<String>,
}

async fn list_stages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<PipelineStage>>, ApiError> {
    Ok(Json(
        state.accessors.list::<PipelineStage>(&user.user_id).await?,
    ))
}

async fn create_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewStage>,
) -> Result<Json<PipelineStage>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("name is required".to_string()));
    }

    let stage = PipelineStage {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: payload.name,
        order_index: payload.order_index,
        color: payload.color,
        created_at: Utc::now(),
    };
    state.accessors.insert(&stage).await?;
    Ok(Json(stage))
}

async fn update_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<PipelineStage>, ApiError> {
    let existing: PipelineStage = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let updated = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
    if !state.accessors.replace(&updated).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(updated))
}

async fn remove_stage(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state
        .accessors
        .delete::<PipelineStage>(&user.user_id, id)
        .await?
    {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
