//! HTTP API.
//!
//! All entity routes hang off `/api/v1` and require a bearer token; the
//! auth middleware in [`crate::gateway`] runs in front of everything
//! except the health probes.

pub mod activity;
pub mod assistant;
pub mod clients;
pub mod dashboard;
pub mod deals;
pub mod error;
pub mod health;
pub mod leads;
pub mod projects;

pub use error::ApiError;

use axum::Router;

use crate::AppState;

/// Assemble the full route tree (before middleware).
pub fn create_router() -> Router<AppState> {
    let api = Router::new()
        .merge(clients::router())
        .merge(leads::router())
        .merge(deals::router())
        .merge(projects::router())
        .merge(activity::router())
        .merge(dashboard::router())
        .merge(assistant::router());

    Router::new().merge(health::router()).nest("/api/v1", api)
}
