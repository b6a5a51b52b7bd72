//! `zoonet animal <id>` – show one animal record.

use anyhow::Result;
use zoonet_core::client::ApiClient;
use zoonet_core::transport::Transport;

pub async fn run_animal<T: Transport>(client: &ApiClient<T>, id: i64) -> Result<()> {
    let animal = client.animal(id).await?;
    println!("#{} {} ({})", animal.id, animal.name, animal.species);
    if let Some(status) = animal.status {
        println!("exhibit: {status}");
    }
    Ok(())
}
