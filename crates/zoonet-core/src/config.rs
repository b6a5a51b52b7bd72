//! Global configuration loaded from `~/.config/zoonet/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::proxy::ProxyConfig;
use crate::retry::RetryPolicy;

/// Retry parameters (optional section in config.toml). Missing values fall
/// back to the built-in API policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Initial backoff in milliseconds; doubles per retry.
    pub initial_backoff_ms: u64,
    /// Per-attempt timeout in milliseconds.
    pub per_attempt_timeout_ms: u64,
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            per_attempt_timeout: Duration::from_millis(self.per_attempt_timeout_ms),
        }
    }
}

/// Proxy section: which paths are pre-cached and which always hit the
/// network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySection {
    /// Path prefixes excluded from caching (dynamic API traffic).
    pub dynamic_prefixes: Vec<String>,
    /// Health-check path, also excluded.
    pub liveness_path: String,
    /// Shell key served to offline navigations.
    pub shell_fallback: String,
    /// App-shell paths fetched into the cache at install time.
    pub precache: Vec<String>,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            dynamic_prefixes: vec!["/api/".to_string()],
            liveness_path: "/ping".to_string(),
            shell_fallback: "/index.html".to_string(),
            precache: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/styles.css".to_string(),
                "/zoo.js".to_string(),
                "/manifest.json".to_string(),
                "/icon-192.png".to_string(),
                "/icon-512.png".to_string(),
            ],
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoonetConfig {
    /// Origin of the zoo backend.
    pub origin: String,
    /// Cache generation tag; bump it to invalidate every cached asset.
    pub cache_generation: String,
    /// Optional retry overrides; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional proxy overrides.
    #[serde(default)]
    pub proxy: Option<ProxySection>,
}

impl Default for ZoonetConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            cache_generation: "ntc-zoo-cache-v1".to_string(),
            retry: None,
            proxy: None,
        }
    }
}

impl ZoonetConfig {
    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).with_context(|| format!("invalid origin: {}", self.origin))
    }

    /// Retry policy for the named API operations, with config overrides
    /// applied when present.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_else(RetryPolicy::api)
    }

    /// Assemble the constructor-time proxy configuration.
    pub fn proxy_config(&self) -> Result<ProxyConfig> {
        let section = self.proxy.clone().unwrap_or_default();
        Ok(ProxyConfig {
            origin: self.origin_url()?,
            dynamic_prefixes: section.dynamic_prefixes,
            liveness_path: section.liveness_path,
            shell_fallback: section.shell_fallback,
            precache_paths: section.precache,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("zoonet")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ZoonetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ZoonetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ZoonetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
