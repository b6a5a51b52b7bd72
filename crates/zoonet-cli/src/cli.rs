use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use zoonet_core::cache::CacheStore;
use zoonet_core::client::ApiClient;
use zoonet_core::config;
use zoonet_core::notify::LogNotifier;
use zoonet_core::proxy::InterceptProxy;
use zoonet_core::transport::CurlTransport;

mod commands;

/// Top-level CLI for the zoonet offline-first network layer.
#[derive(Debug, Parser)]
#[command(name = "zoonet")]
#[command(about = "zoonet: retrying client and offline cache for the NTC Zoo API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Wake the zoo backend (retries the liveness endpoint until it answers).
    Wake,

    /// List all animals from the live API.
    Animals,

    /// Show a single animal by its ID.
    Animal {
        /// Animal identifier.
        id: i64,
    },

    /// Fetch a path through the offline-first proxy.
    Get {
        /// Request path (e.g. /styles.css).
        path: String,

        /// Treat the request as a page navigation.
        #[arg(long)]
        navigate: bool,
    },

    /// Pre-cache the app shell into the current cache generation.
    Warm,

    /// Drop every cache generation except the current one.
    Gc,

    /// Show cached entry counts per generation.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let origin = cfg.origin_url()?;
        // Curl enforces the same deadline the retry layer does, so a timed
        // out attempt's transfer cannot outlive its attempt.
        let transport =
            CurlTransport::new().with_transfer_timeout(cfg.retry_policy().per_attempt_timeout);

        match cli.command {
            CliCommand::Wake => {
                let client = ApiClient::new(origin, transport)
                    .with_policy(cfg.retry_policy())
                    .with_notifier(Arc::new(LogNotifier));
                commands::run_wake(&client).await
            }
            CliCommand::Animals => {
                let client = ApiClient::new(origin, transport).with_policy(cfg.retry_policy());
                commands::run_animals(&client).await
            }
            CliCommand::Animal { id } => {
                let client = ApiClient::new(origin, transport).with_policy(cfg.retry_policy());
                commands::run_animal(&client, id).await
            }
            CliCommand::Get { path, navigate } => {
                let proxy = open_proxy(&cfg, transport).await?;
                commands::run_get(&proxy, &cfg, &path, navigate).await
            }
            CliCommand::Warm => {
                let proxy = open_proxy(&cfg, transport).await?;
                commands::run_warm(&proxy).await
            }
            CliCommand::Gc => {
                let proxy = open_proxy(&cfg, transport).await?;
                commands::run_gc(&proxy).await
            }
            CliCommand::Status => {
                let store = CacheStore::open_generation(&cfg.cache_generation).await?;
                commands::run_status(&store).await
            }
        }
    }
}

async fn open_proxy(
    cfg: &zoonet_core::config::ZoonetConfig,
    transport: CurlTransport,
) -> Result<InterceptProxy<CurlTransport>> {
    let store = CacheStore::open_generation(&cfg.cache_generation).await?;
    Ok(InterceptProxy::new(cfg.proxy_config()?, store, transport))
}
