//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::assistant::{OpenAiClient, OpenAiSettings};
use crate::config::AppConfig;
use crate::database::{Accessors, Store};
use crate::gateway;
use crate::logging::OpTimer;
use crate::{log_banner, log_init_step, log_init_warning, log_success, AppState};

/// CRM API version (from Cargo.toml).
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create the application with all routes and middleware.
pub async fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let step_timer = OpTimer::new("server", "database");
    let store_result = Store::sqlite(&config.database.path).await;
    step_timer.finish_with_result(store_result.as_ref());
    let store = store_result?;
    create_app_with_store(config, store)
}

/// Create the application over an already-open store.
///
/// Tests use this with [`Store::in_memory`].
pub fn create_app_with_store(config: AppConfig, store: Store) -> anyhow::Result<Router> {
    let overall_timer = OpTimer::new("server", "create_app");

    log_banner!(
        format!("🚀 CRM API v{VERSION}"),
        format!("Database: {}", config.database.path)
    );

    // [1/4] Store is open and bootstrapped by the caller
    log_init_step!(1, 4, "Database", format!("🗄️  {store:?}"));

    // [2/4] Assistant client
    let step_timer = OpTimer::new("server", "assistant");
    let assistant = create_assistant(&config)?;
    if assistant.is_some() {
        log_init_step!(
            2,
            4,
            "Assistant",
            format!("🤖 OpenAI ({})", config.assistant.model)
        );
    } else {
        log_init_step!(2, 4, "Assistant", "🤖 Disabled");
    }
    step_timer.finish();

    // [3/4] Entity accessors + cache
    let step_timer = OpTimer::new("server", "accessors");
    let accessors = Accessors::new(store);
    log_init_step!(3, 4, "Accessors", "📇 Entity CRUD + list cache ready");
    step_timer.finish();

    let state = AppState {
        config: Arc::new(config.clone()),
        accessors,
        assistant,
    };

    // [4/4] Router with middleware
    let step_timer = OpTimer::new("server", "router");
    let app = api::create_router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            gateway::auth::auth_middleware,
        ))
        .with_state(state);
    log_init_step!(4, 4, "Router", "🌐 Routes + middleware configured");
    step_timer.finish();

    overall_timer.finish();
    log_success!("CRM API server created successfully");
    tracing::info!("");

    Ok(app)
}

/// Build the OpenAI client from config, or `None` when disabled.
fn create_assistant(config: &AppConfig) -> anyhow::Result<Option<OpenAiClient>> {
    if !config.assistant.enabled {
        return Ok(None);
    }
    let Some(api_key) = config.assistant.api_key.clone() else {
        // The validator rejects this combination at startup; tolerate it
        // here for callers that load unchecked configs.
        log_init_warning!("Assistant enabled but no OpenAI API key configured");
        return Ok(None);
    };

    let client = OpenAiClient::new(OpenAiSettings {
        api_key,
        base_url: config.assistant.base_url.clone(),
        model: config.assistant.model.clone(),
        max_tokens: config.assistant.max_tokens,
        temperature: config.assistant.temperature,
    })?;
    Ok(Some(client))
}
