//! `zoonet status` – cached entry counts per generation.

use anyhow::Result;
use zoonet_core::cache::CacheStore;

pub async fn run_status(store: &CacheStore) -> Result<()> {
    let stats = store.stats().await?;
    if stats.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }
    println!("{:<28} {:<8} {}", "GENERATION", "ENTRIES", "");
    for s in stats {
        let marker = if s.generation == store.generation() {
            "(current)"
        } else {
            ""
        };
        println!("{:<28} {:<8} {}", s.generation, s.entries, marker);
    }
    Ok(())
}
