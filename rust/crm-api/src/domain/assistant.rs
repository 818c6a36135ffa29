//! AI assistant conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One prompt/response pair from the content generation gateway.
///
/// Append-only; rows are written best-effort after a successful generation
/// and never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConversation {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub response: String,
    /// Content category tag, e.g. "follow-up-email". Stored verbatim so
    /// unknown tags survive round-trips.
    pub content_type: String,
    #[serde(default)]
    pub context: Option<String>,
    pub created_at: DateTime<Utc>,
}
