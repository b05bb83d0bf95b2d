//! Knowledge API handlers.
//!
//! Routes:
//! - `GET  /knowledge`: list items (`moduleSlug`, `status` query)
//! - `POST /knowledge`: upsert an item
//! - `POST /knowledge/summarize`: disabled summarizer, always skipped

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::{Router, routing::post};
use jarvis_core::{KnowledgeItem, KnowledgeStatus, KnowledgeUpsert, ListFilter, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::SharedState;

/// Knowledge routes, mounted at the root.
pub fn knowledge_router() -> Router<SharedState> {
    Router::new()
        .route("/knowledge", axum::routing::get(list_handler).post(save_handler))
        .route("/knowledge/summarize", post(summarize_handler))
}

// ── Responses ─────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct ListResponse {
    pub ok: bool,
    pub items: Vec<KnowledgeItem>,
}

#[derive(Serialize, Deserialize)]
pub struct SaveResponse {
    pub ok: bool,
    pub item: KnowledgeItem,
}

#[derive(Serialize, Deserialize)]
pub struct SkippedResponse {
    pub ok: bool,
    pub skipped: bool,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

/// A failed knowledge request. Every failure, whether bad input or a store
/// fault, renders as HTTP 400 with `{ "ok": false, "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    message: String,
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_client_error() {
            warn!(error = %err, "Rejected knowledge request");
        } else {
            error!(error = %err, "Knowledge store request failed");
        }
        Self {
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Rejected knowledge body");
        Self {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            ok: false,
            error: self.message,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "moduleSlug", alias = "module_slug")]
    pub module_slug: Option<String>,
    pub status: Option<String>,
}

async fn list_handler(
    State(state): State<SharedState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(params) = params?;

    let status = match params.status.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse::<KnowledgeStatus>()?,
        _ => KnowledgeStatus::Active,
    };

    let mut filter = ListFilter::active()
        .with_status(status)
        .with_limit(state.list_limit);
    if let Some(module) = params.module_slug.filter(|m| !m.trim().is_empty()) {
        filter = filter.with_module(module);
    }

    let items = state.store.list(filter).await?;
    debug!(count = items.len(), "Listed knowledge items");
    Ok(Json(ListResponse { ok: true, items }))
}

async fn save_handler(
    State(state): State<SharedState>,
    payload: Result<Json<KnowledgeUpsert>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(input) = payload?;

    let item = state.store.upsert(input).await?;
    info!(id = %item.id, module = ?item.module_slug, "Saved knowledge item");
    Ok(Json(SaveResponse { ok: true, item }))
}

/// Summarization is disabled; the endpoint exists so callers need not
/// special-case it.
async fn summarize_handler() -> Json<SkippedResponse> {
    debug!("Knowledge summarizer is disabled; skipping");
    Json(SkippedResponse {
        ok: true,
        skipped: true,
    })
}
