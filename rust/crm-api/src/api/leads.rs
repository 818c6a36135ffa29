//! Lead endpoints.

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
use crate::domain::{Lead, LeadStatus};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list).post(create))
        .route("/leads/{id}", axum::routing::patch(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct NewLead {
    #[serde(default)]
    contact_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    status: LeadStatus,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    target_date: Option<NaiveDate>,
    #[serde(default)]
    contacted_date: Option<NaiveDate>,
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    Ok(Json(state.accessors.list::<Lead>(&user.user_id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewLead>,
) -> Result<Json<Lead>, ApiError> {
    let has_identity = payload
        .contact_name
        .as_deref()
        .is_some_and(|n| !n.trim().is_empty())
        || payload
            .company
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty());
    if !has_identity {
        return Err(ApiError::InvalidRequest(
            "contact_name or company is required".to_string(),
        ));
    }

    let now = Utc::now();
    let lead = Lead {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        contact_name: payload.contact_name,
        email: payload.email,
        phone: payload.phone,
        company: payload.company,
        value: payload.value,
        status: payload.status,
        source: payload.source,
        tags: payload.tags,
        notes: payload.notes,
        target_date: payload.target_date,
        contacted_date: payload.contacted_date,
        created_at: now,
        updated_at: now,
    };
    state.accessors.insert(&lead).await?;
    Ok(Json(lead))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Lead>, ApiError> {
    let existing: Lead = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let mut updated: Lead = apply_patch(&existing, &patch).map_err(ApiError::InvalidRequest)?;
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
    if !state.accessors.delete::<Lead>(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
