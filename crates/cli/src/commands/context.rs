//! `jarvis context` — Build the ranked knowledge context.

use jarvis_context::{BuildOptions, ContextBuilder, render_context};
use std::path::Path;

pub async fn run(
    explicit: Option<&Path>,
    tags: Vec<String>,
    max_items: Option<usize>,
    render: bool,
) -> anyhow::Result<()> {
    let config = super::load_config(explicit)?;
    let store = jarvis_store::open(&config.store).await?;

    let builder =
        ContextBuilder::new(store).with_default_max_items(config.context.default_max_items);
    let options = BuildOptions {
        intent_tags: (!tags.is_empty()).then_some(tags),
        max_items,
    };

    let blocks = builder.build_context(&options).await?;
    if render {
        print!("{}", render_context(&blocks));
    } else {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
    }
    Ok(())
}
