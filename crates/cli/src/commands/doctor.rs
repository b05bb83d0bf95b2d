//! `jarvis doctor` — Diagnose config and store health.
//!
//! Exits nonzero when any check fails.

use std::path::Path;

pub async fn run(explicit: Option<&Path>) -> anyhow::Result<()> {
    println!("🩺 Jarvis Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config_path = super::config_path(explicit);
    if !config_path.exists() {
        println!(
            "  ℹ️  No config file at {}, using defaults — run `jarvis init` to write one",
            config_path.display()
        );
    }

    let config = match super::load_config(explicit) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e:#}");
            issues += 1;
            println!();
            return verdict(issues);
        }
    };

    match jarvis_store::open(&config.store).await {
        Ok(store) => match store.count().await {
            Ok(n) => println!("  ✅ Store '{}' reachable ({n} items)", store.name()),
            Err(e) => {
                println!("  ❌ Store '{}' query failed: {e}", store.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Store could not be opened: {e}");
            issues += 1;
        }
    }

    if config.context.default_max_items == 0 {
        println!("  ⚠️  context.default_max_items is 0 — context will always be empty");
        issues += 1;
    } else {
        println!(
            "  ✅ Context budget: {} items",
            config.context.default_max_items
        );
    }

    println!();
    verdict(issues)
}

fn verdict(issues: usize) -> anyhow::Result<()> {
    if issues == 0 {
        println!("  🎉 All checks passed!");
        Ok(())
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        anyhow::bail!("doctor found {issues} issue(s)")
    }
}
