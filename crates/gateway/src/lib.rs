//! HTTP API gateway for Jarvis.
//!
//! Exposes the knowledge store over REST:
//!
//! - `GET  /knowledge` lists items, optionally filtered by module and status
//! - `POST /knowledge` creates or replaces an item
//! - `POST /knowledge/summarize` is accepted and skipped
//! - `GET  /health` reports liveness
//!
//! Every knowledge response carries an `ok` flag; failures are
//! `{ "ok": false, "error": "..." }`.
//!
//! Built on Axum.

pub mod api;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use jarvis_config::AppConfig;
use jarvis_core::KnowledgeStore;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub store: Arc<dyn KnowledgeStore>,
    /// Page size of `GET /knowledge`.
    pub list_limit: usize,
}

impl GatewayState {
    pub fn new(store: Arc<dyn KnowledgeStore>, config: &AppConfig) -> Self {
        Self {
            store,
            list_limit: config.gateway.list_limit,
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - HTTP trace logging
/// - CORS limited to the local dashboard origin
/// - Request body size limit
pub fn build_router(state: SharedState, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(HeaderValue::from_static(
            "http://localhost:8080",
        )))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler))
        .merge(api::knowledge_router())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
}

/// Start the gateway HTTP server on the configured address.
pub async fn start(config: &AppConfig, store: Arc<dyn KnowledgeStore>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = Arc::new(GatewayState::new(store, config));
    let app = build_router(state, config.gateway.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");
    axum::serve(listener, app).await
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
