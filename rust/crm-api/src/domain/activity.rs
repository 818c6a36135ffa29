//! Scheduled communications and follow-up reminders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Communication channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationKind {
    Email,
    Call,
    Meeting,
    Note,
}

impl CommunicationKind {
    /// Whether this kind shows up in the "today's meetings" view.
    #[must_use]
    pub fn is_meeting_like(self) -> bool {
        matches!(self, Self::Meeting | Self::Call)
    }
}

/// A logged or scheduled communication with a client.
///
/// A row with `scheduled_at` set and `completed_at` unset is an upcoming
/// appointment; completing it sets `completed_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: CommunicationKind,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Follow-up flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    Reminder,
    Escalation,
    AutoFollowup,
}

/// A scheduled reminder, optionally tied to a client.
///
/// "Overdue" is derived (`scheduled_for <= now` while pending), never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: FollowUpKind,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_for: DateTime<Utc>,
    /// Set when the follow-up is marked done; pending while `None`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_suggested: bool,
    pub created_at: DateTime<Utc>,
}

impl FollowUp {
    /// Pending means not yet completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Follow-up with its client name embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpWithClient {
    #[serde(flatten)]
    pub follow_up: FollowUp,
    pub client: Option<super::ClientRef>,
}
