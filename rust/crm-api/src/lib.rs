//! CRM API - Small-business CRM backend
//!
//! A single-binary HTTP service that owns the CRM data model locally
//! (SQLite) and exposes it as a JSON REST API:
//!
//! - **Entities**: clients, leads, deals and pipeline stages, projects,
//!   tasks, communications, follow-ups, client interaction logs
//! - **Dashboard**: headline stats, overdue/upcoming follow-up partition,
//!   today's meetings
//! - **Meeting prep**: per-client bundle of recent history and open deals
//! - **Assistant**: AI content generation via OpenAI chat completions,
//!   with a per-user conversation log
//!
//! # Architecture
//!
//! - [`config`]: Configuration management and environment loading
//! - [`gateway`]: JWT bearer authentication
//! - [`domain`]: Core domain models and status enums
//! - [`database`]: Document store (SQLite / in-memory), typed accessors,
//!   list cache
//! - [`crm`]: Derived views (dashboard, follow-up partition, meeting prep)
//! - [`assistant`]: OpenAI content generation gateway
//! - [`api`]: HTTP API endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use crm_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let app = create_app(config).await?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod assistant;
pub mod config;
pub mod crm;
pub mod database;
pub mod domain;
pub mod gateway;
pub mod logging;
pub mod server;

use std::sync::Arc;

use assistant::OpenAiClient;
use config::AppConfig;
use database::Accessors;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Typed entity accessors over the backing store.
    pub accessors: Accessors,
    /// OpenAI client; `None` when the assistant is disabled.
    pub assistant: Option<OpenAiClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"AppConfig")
            .field("accessors", &self.accessors)
            .field("assistant", &self.assistant.is_some())
            .finish()
    }
}
