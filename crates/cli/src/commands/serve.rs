//! `jarvis serve` — Start the HTTP API server.

use anyhow::Context;
use std::path::Path;

pub async fn run(explicit: Option<&Path>, port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = super::load_config(explicit)?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let store = jarvis_store::open(&config.store).await?;

    println!("Jarvis Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Store:     {}", store.name());

    jarvis_gateway::start(&config, store)
        .await
        .context("Gateway stopped with an error")?;
    Ok(())
}
