//! Clients and their interaction history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: String,
    /// Client name (required).
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Timestamp of the most recent logged interaction.
    ///
    /// Updated as a best-effort second write whenever an interaction is
    /// created; may lag behind the interaction log if that write fails.
    #[serde(default)]
    pub last_contact: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Embedded client reference (one level of relationship expansion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRef {
    pub name: String,
}

/// An append-only contact record attached to a client.
///
/// Interactions carry no owner column; access is scoped through the owning
/// client (see DESIGN.md). The `type` field is free text as logged by the
/// user, e.g. "Phone Call" or "meeting".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
