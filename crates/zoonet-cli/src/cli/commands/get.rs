//! `zoonet get <path>` – fetch a path through the offline-first proxy.
//!
//! Pass-through classifications (API paths, the liveness endpoint) fall back
//! to the retrying network path, exactly as they would in the app.

use anyhow::{Context, Result};
use zoonet_core::config::ZoonetConfig;
use zoonet_core::proxy::{InterceptProxy, ProxyOutcome, ServedFrom};
use zoonet_core::request::RequestDescriptor;
use zoonet_core::retry::RetryingFetcher;
use zoonet_core::transport::CurlTransport;

pub async fn run_get(
    proxy: &InterceptProxy<CurlTransport>,
    cfg: &ZoonetConfig,
    path: &str,
    navigate: bool,
) -> Result<()> {
    let url = cfg
        .origin_url()?
        .join(path)
        .with_context(|| format!("bad request path: {path}"))?;
    let req = if navigate {
        RequestDescriptor::navigation(url)
    } else {
        RequestDescriptor::get(url)
    };

    match proxy.handle(&req).await? {
        ProxyOutcome::Served(resp) => {
            let source = match resp.served_from {
                ServedFrom::Network => "network",
                ServedFrom::Cache => "cache",
                ServedFrom::Fallback => "fallback (cached shell)",
            };
            println!(
                "HTTP {} via {} ({} bytes, {})",
                resp.status,
                source,
                resp.body.len(),
                resp.content_type.as_deref().unwrap_or("unknown type")
            );
        }
        ProxyOutcome::PassThrough => {
            let policy = cfg.retry_policy();
            let fetcher = RetryingFetcher::new(
                CurlTransport::new().with_transfer_timeout(policy.per_attempt_timeout),
            );
            let resp = fetcher.execute(&req, &policy).await?;
            println!(
                "HTTP {} via pass-through network ({} bytes, {})",
                resp.status,
                resp.body.len(),
                resp.content_type.as_deref().unwrap_or("unknown type")
            );
        }
    }
    Ok(())
}
