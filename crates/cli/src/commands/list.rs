//! `jarvis list` — Print knowledge items as JSON.

use jarvis_core::{KnowledgeStatus, ListFilter};
use std::path::Path;

pub async fn run(
    explicit: Option<&Path>,
    module: Option<String>,
    status: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let config = super::load_config(explicit)?;
    let store = jarvis_store::open(&config.store).await?;

    let status = match status {
        Some(s) => s.parse::<KnowledgeStatus>()?,
        None => KnowledgeStatus::Active,
    };
    let mut filter = ListFilter::active()
        .with_status(status)
        .with_limit(limit.unwrap_or(config.gateway.list_limit));
    if let Some(module) = module {
        filter = filter.with_module(module);
    }

    let items = store.list(filter).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
