//! Content generation endpoints.

use axum::{extract::State, routing::get, routing::post, Extension, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::assistant::{system_prompt, user_message};
use crate::domain::AiConversation;
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assistant/generate", post(generate))
        .route("/assistant/conversations", get(conversations))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
    content_type: String,
    #[serde(default)]
    context: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<Uuid>,
}

async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::InvalidRequest("prompt is required".to_string()));
    }
    if payload.content_type.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "content_type is required".to_string(),
        ));
    }

    let Some(client) = &state.assistant else {
        return Err(ApiError::InvalidRequest(
            "content generation is disabled".to_string(),
        ));
    };

    let system = system_prompt(&payload.content_type);
    let user_msg = user_message(&payload.prompt, payload.context.as_deref());
    let content = client
        .complete(system, &user_msg)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    // Best-effort log; generation already succeeded.
    let conversation = AiConversation {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        prompt: payload.prompt,
        response: content.clone(),
        content_type: payload.content_type,
        context: payload.context,
        created_at: Utc::now(),
    };
    let conversation_id = match state.accessors.insert(&conversation).await {
        Ok(()) => Some(conversation.id),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save conversation");
            None
        }
    };

    Ok(Json(GenerateResponse {
        content,
        conversation_id,
    }))
}

async fn conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<AiConversation>>, ApiError> {
    Ok(Json(
        state.accessors.list::<AiConversation>(&user.user_id).await?,
    ))
}
