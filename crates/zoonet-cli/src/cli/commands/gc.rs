//! `zoonet gc` – drop stale cache generations (proxy activate step).

use anyhow::Result;
use zoonet_core::proxy::InterceptProxy;
use zoonet_core::transport::Transport;

pub async fn run_gc<T: Transport>(proxy: &InterceptProxy<T>) -> Result<()> {
    let dropped = proxy.activate().await?;
    if dropped == 0 {
        println!("No stale generations.");
    } else {
        println!(
            "Dropped {dropped} stale entries; current generation is {}.",
            proxy.store().generation()
        );
    }
    Ok(())
}
