//! End-to-end integration tests for Jarvis.
//!
//! These tests exercise the full pipeline: items saved through the HTTP
//! gateway land in a SQLite file, and the context builder reads them back
//! ranked and truncated.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use jarvis_config::{AppConfig, StoreBackend};
use jarvis_context::{BuildOptions, ContextBuilder, render_context};
use jarvis_core::{KnowledgeStore, KnowledgeUpsert, ListFilter};
use jarvis_gateway::{GatewayState, build_router};
use tower::ServiceExt;

// ── Helpers ──────────────────────────────────────────────────────────────

fn sqlite_config(dir: &tempfile::TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Sqlite;
    config.store.database_url = Some(format!(
        "sqlite://{}",
        dir.path().join("knowledge.sqlite").display()
    ));
    config
}

async fn post_item(app: axum::Router, body: serde_json::Value) -> serde_json::Value {
    let req = Request::builder()
        .method("POST")
        .uri("/knowledge")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_over_http_then_build_context_from_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);
    let store = jarvis_store::open(&config.store).await.unwrap();
    assert_eq!(store.name(), "sqlite");

    let state = Arc::new(GatewayState::new(store.clone(), &config));
    let app = build_router(state, config.gateway.body_limit_bytes);

    post_item(
        app.clone(),
        serde_json::json!({
            "title": "Position sizing",
            "content_markdown": "Never risk more than 1% per trade.",
            "importance": 1,
            "tags": ["trading"],
            "moduleSlug": "trading",
        }),
    )
    .await;
    post_item(
        app.clone(),
        serde_json::json!({
            "title": "Sleep",
            "content_markdown": "Protect eight hours.",
            "importance": 5,
            "jarvis_instructions": "Mention only when asked about routine.",
        }),
    )
    .await;
    post_item(
        app.clone(),
        serde_json::json!({
            "title": "Journal",
            "content_markdown": "Log every trade.",
            "importance": 2,
            "tags": ["trading", "habits"],
        }),
    )
    .await;
    post_item(
        app,
        serde_json::json!({
            "title": "Retired rule",
            "content_markdown": "Old.",
            "importance": 100,
            "status": "archived",
        }),
    )
    .await;

    let builder = ContextBuilder::new(store.clone());
    let opts = BuildOptions::default()
        .with_intent_tags(["trading"])
        .with_max_items(2);
    let blocks = builder.build_context(&opts).await.unwrap();

    // Sleep 5, Journal 2+2, Position sizing 1+2; archived items never compete.
    let titles: Vec<&str> = blocks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Sleep", "Journal"]);
    assert_eq!(
        blocks[0].instructions.as_deref(),
        Some("Mention only when asked about routine.")
    );

    let rendered = render_context(&blocks);
    assert!(rendered.starts_with("[Knowledge]\n### Sleep (fact, importance 5)"));
    assert!(rendered.contains("Log every trade."));
    assert!(!rendered.contains("Position sizing"));
}

#[tokio::test]
async fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);

    {
        let store = jarvis_store::open(&config.store).await.unwrap();
        store
            .upsert(KnowledgeUpsert::new("Persisted", "still here").with_importance(4.0))
            .await
            .unwrap();
    }

    let store = jarvis_store::open(&config.store).await.unwrap();
    let items = store.list(ListFilter::active()).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Persisted");

    let blocks = ContextBuilder::new(store)
        .build_context(&BuildOptions::default())
        .await
        .unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].importance, Some(4.0));
}

#[tokio::test]
async fn list_endpoint_reads_what_context_builder_ranks() {
    let dir = tempfile::tempdir().unwrap();
    let config = sqlite_config(&dir);
    let store = jarvis_store::open(&config.store).await.unwrap();

    for (title, importance) in [("A", 1.0), ("B", 3.0), ("C", 2.0)] {
        store
            .upsert(KnowledgeUpsert::new(title, "body").with_importance(importance))
            .await
            .unwrap();
    }

    let app = build_router(
        Arc::new(GatewayState::new(store.clone(), &config)),
        config.gateway.body_limit_bytes,
    );
    let req = Request::builder()
        .uri("/knowledge")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let listed: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap())
        .collect();
    assert_eq!(listed, vec!["C", "B", "A"]);

    let blocks = ContextBuilder::new(store)
        .build_context(&BuildOptions::default())
        .await
        .unwrap();
    let ranked: Vec<&str> = blocks.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(ranked, vec!["B", "C", "A"]);
}

#[tokio::test]
async fn in_memory_backend_from_env_override() {
    let mut config = AppConfig::default();
    config
        .apply_overrides(|k| (k == "JARVIS_STORE_BACKEND").then(|| "memory".to_string()))
        .unwrap();

    let store = jarvis_store::open(&config.store).await.unwrap();
    assert_eq!(store.name(), "in_memory");

    let blocks = ContextBuilder::new(store)
        .build_context(&BuildOptions::default())
        .await
        .unwrap();
    assert!(blocks.is_empty());
}
