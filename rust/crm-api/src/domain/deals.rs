//! Deals and the pipeline stages they move through.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deal status. `won` and `lost` are terminal by convention only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Active,
    Won,
    Lost,
}

/// A deal in the sales pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    pub id: Uuid,
    pub user_id: String,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Monetary value; `None` means "not specified" and counts as 0 in sums.
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub stage_id: Option<Uuid>,
    /// Win probability, 0-100.
    #[serde(default)]
    pub probability: Option<i32>,
    pub status: DealStatus,
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_close_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named, ordered bucket a deal occupies within the sales process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// Position in the pipeline, ascending.
    pub order_index: i32,
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Embedded pipeline stage reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRef {
    pub name: String,
    pub color: Option<String>,
}

/// Deal with one level of relationship expansion, as returned by list reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealWithRelations {
    #[serde(flatten)]
    pub deal: Deal,
    /// Related client name, when the deal belongs to a client that still exists.
    pub client: Option<super::ClientRef>,
    /// Related stage name and color.
    pub stage: Option<StageRef>,
}
