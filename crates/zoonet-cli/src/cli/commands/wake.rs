//! `zoonet wake` – spin up the (possibly sleeping) zoo backend.

use anyhow::Result;
use zoonet_core::client::ApiClient;
use zoonet_core::transport::Transport;

pub async fn run_wake<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    client.wake().await?;
    println!("Zoo API is awake.");
    Ok(())
}
