//! `zoonet animals` – list every animal from the live API.

use anyhow::Result;
use zoonet_core::client::ApiClient;
use zoonet_core::transport::Transport;

pub async fn run_animals<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    let animals = client.list_animals().await?;
    if animals.is_empty() {
        println!("No animals in the catalog.");
        return Ok(());
    }
    println!("{:<6} {:<16} {:<12} {}", "ID", "NAME", "SPECIES", "STATUS");
    for a in animals {
        println!(
            "{:<6} {:<16} {:<12} {}",
            a.id,
            a.name,
            a.species,
            a.status.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
