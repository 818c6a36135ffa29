//! Client endpoints, including the interaction log and meeting prep.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use crate::crm::MeetingPrep;
use crate::database::accessors::apply_patch;
use crate::domain::{Client, Interaction};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list).post(create))
        .route("/clients/{id}", axum::routing::patch(update).delete(remove))
        .route(
            "/clients/{id}/interactions",
            get(list_interactions).post(create_interaction),
        )
        .route("/clients/{id}/meeting-prep", get(meeting_prep))
}

#[derive(Debug, Deserialize)]
struct NewClient {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Client>>, ApiError> {
    Ok(Json(state.accessors.list::<Client>(&user.user_id).await?))
}

async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<NewClient>,
) -> Result<Json<Client>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("name is required".to_string()));
    }

    let client = Client {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        company: payload.company,
        notes: payload.notes,
        tags: payload.tags,
        last_contact: None,
        created_at: Utc::now(),
    };
    state.accessors.insert(&client).await?;
    Ok(Json(client))
}

async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Value>,
) -> Result<Json<Client>, ApiError> {
    let existing: Client = state
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

async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.accessors.delete_client(&user.user_id, id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
struct NewInteraction {
    #[serde(rename = "type")]
    kind: String,
    content: String,
}

async fn list_interactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Interaction>>, ApiError> {
    let interactions = state
        .accessors
        .list_interactions(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(interactions))
}

async fn create_interaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewInteraction>,
) -> Result<Json<Interaction>, ApiError> {
    if payload.kind.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "type and content are required".to_string(),
        ));
    }

    let interaction = Interaction {
        id: Uuid::new_v4(),
        client_id: id,
        kind: payload.kind,
        content: payload.content,
        created_at: Utc::now(),
    };
    let recorded = state
        .accessors
        .record_interaction(&user.user_id, interaction)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(recorded))
}

async fn meeting_prep(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<MeetingPrep>, ApiError> {
    let client: Client = state
        .accessors
        .get(&user.user_id, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let interactions = state
        .accessors
        .list_interactions(&user.user_id, id)
        .await?
        .unwrap_or_default();
    let deals = state.accessors.client_deals(&user.user_id, id).await?;

    Ok(Json(MeetingPrep::assemble(
        client,
        interactions,
        deals,
        Utc::now(),
    )))
}
