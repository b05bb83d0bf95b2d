//! `jarvis save` — Upsert a knowledge item from a JSON file or stdin.

use anyhow::Context;
use jarvis_core::KnowledgeUpsert;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub async fn run(explicit: Option<&Path>, file: &Path) -> anyhow::Result<()> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };

    let input: KnowledgeUpsert =
        serde_json::from_str(&raw).context("Input is not a valid knowledge item")?;

    let config = super::load_config(explicit)?;
    let store = jarvis_store::open(&config.store).await?;
    let item = store.upsert(input).await?;

    info!(id = %item.id, store = store.name(), "Saved knowledge item");
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}
