//! Dashboard endpoints.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::error::ApiError;
use crate::crm::{partition_follow_ups, todays_meetings, DashboardStats, FollowUpBuckets};
use crate::domain::{Client, Communication, Deal, FollowUp, Task};
use crate::gateway::AuthenticatedUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/follow-ups", get(follow_ups))
        .route("/dashboard/meetings/today", get(meetings_today))
}

async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardStats>, ApiError> {
    let clients = state.accessors.list::<Client>(&user.user_id).await?;
    let deals = state.accessors.list::<Deal>(&user.user_id).await?;
    let follow_ups = state.accessors.list::<FollowUp>(&user.user_id).await?;
    let tasks = state.accessors.list::<Task>(&user.user_id).await?;

    Ok(Json(DashboardStats::compute(
        &clients,
        &deals,
        &follow_ups,
        &tasks,
    )))
}

async fn follow_ups(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<FollowUpBuckets>, ApiError> {
    let follow_ups = state
        .accessors
        .list_follow_ups_with_client(&user.user_id)
        .await?;
    Ok(Json(partition_follow_ups(follow_ups, Utc::now())))
}

#[derive(Debug, Deserialize)]
struct MeetingsQuery {
    /// Caller's UTC offset in minutes (east positive). Defaults to UTC.
    #[serde(default)]
    tz_offset_minutes: i32,
}

async fn meetings_today(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<MeetingsQuery>,
) -> Result<Json<Vec<Communication>>, ApiError> {
    let communications = state.accessors.list::<Communication>(&user.user_id).await?;
    Ok(Json(todays_meetings(
        communications,
        Utc::now(),
        query.tz_offset_minutes,
    )))
}
