//! Meeting preparation bundle.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{Client, Deal, DealStatus, Interaction};

/// How far back the interaction history reaches.
const HISTORY_DAYS: i64 = 30;
/// Cap on interactions included in the bundle.
const HISTORY_LIMIT: usize = 10;

/// Everything needed to walk into a meeting with a client.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingPrep {
    pub client: Client,
    /// Interactions from the last 30 days, newest first, at most 10.
    pub recent_interactions: Vec<Interaction>,
    /// The client's active deals, newest first.
    pub active_deals: Vec<Deal>,
}

impl MeetingPrep {
    /// Assemble the bundle at `now` from the client's full history.
    ///
    /// Inputs may arrive in any order; both lists come out newest first.
    #[must_use]
    pub fn assemble(
        client: Client,
        interactions: Vec<Interaction>,
        deals: Vec<Deal>,
        now: DateTime<Utc>,
    ) -> Self {
        let cutoff = now - Duration::days(HISTORY_DAYS);
        let mut recent_interactions: Vec<Interaction> = interactions
            .into_iter()
            .filter(|i| i.created_at >= cutoff)
            .collect();
        recent_interactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_interactions.truncate(HISTORY_LIMIT);

        let mut active_deals: Vec<Deal> = deals
            .into_iter()
            .filter(|d| d.status == DealStatus::Active)
            .collect();
        active_deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Self {
            client,
            recent_interactions,
            active_deals,
        }
    }
}
