//! `zoonet warm` – pre-cache the app shell (proxy install step).

use anyhow::Result;
use zoonet_core::proxy::InterceptProxy;
use zoonet_core::transport::Transport;

pub async fn run_warm<T: Transport>(proxy: &InterceptProxy<T>) -> Result<()> {
    proxy.install().await?;
    println!(
        "Pre-cached {} shell paths into generation {}.",
        proxy.config().precache_paths.len(),
        proxy.store().generation()
    );
    Ok(())
}
