//! Application state shared across the gate and the forwarder.

use std::sync::Arc;
use std::time::Duration;

use gate_core::{AccessKey, Error, Result};
use moka::future::Cache;
use provision_client::AccountChecker;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Proxy path prefix stripped before classification (e.g. "/es")
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Upstream search engine
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Permission decision cache
    #[serde(default)]
    pub auth_cache: AuthCacheConfig,
}

fn default_path_prefix() -> String {
    "/es".to_string()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            path_prefix: default_path_prefix(),
            upstream: UpstreamConfig::default(),
            auth_cache: AuthCacheConfig::default(),
        }
    }
}

/// Upstream target for allowed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_scheme")]
    pub scheme: String,
    #[serde(default = "default_upstream_host")]
    pub host: String,
}

fn default_upstream_scheme() -> String {
    "http".to_string()
}

fn default_upstream_host() -> String {
    "elasticsearch:9200".to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            scheme: default_upstream_scheme(),
            host: default_upstream_host(),
        }
    }
}

/// Permission cache policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCacheConfig {
    /// Seconds a cached decision stays trusted
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Entry bound for the cache
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Whether oracle failures are remembered as negative decisions for the
    /// TTL. Trades gate availability against oracle-outage blast radius.
    #[serde(default = "default_cache_failures")]
    pub cache_failures: bool,
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_max_entries() -> u64 {
    10_000
}

fn default_cache_failures() -> bool {
    true
}

impl Default for AuthCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            cache_failures: default_cache_failures(),
        }
    }
}

/// Composite cache key: structured rather than concatenated, so distinct
/// (account, name, secret) triples can never alias one another.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct AccessScope {
    account: String,
    key_name: String,
    key_secret: String,
}

impl AccessScope {
    fn new(account: &str, key: &AccessKey) -> Self {
        Self {
            account: account.to_string(),
            key_name: key.name.clone(),
            key_secret: key.key.clone(),
        }
    }
}

/// Cached permission checks against the provision service.
///
/// The cache is the only mutable state shared between request passes; moka
/// handles its synchronization and TTL expiry internally. Two concurrent
/// misses for the same scope may both query the oracle, which is idempotent.
#[derive(Clone)]
pub struct Authorizer {
    checker: Arc<dyn AccountChecker>,
    cache: Cache<AccessScope, bool>,
    cache_failures: bool,
}

impl Authorizer {
    /// Creates an authorizer from the configured cache policy.
    pub fn new(checker: Arc<dyn AccountChecker>, config: &AuthCacheConfig) -> Self {
        Self::with_ttl(
            checker,
            Duration::from_secs(config.ttl_secs),
            config.max_entries,
            config.cache_failures,
        )
    }

    /// Creates an authorizer with an explicit TTL.
    pub fn with_ttl(
        checker: Arc<dyn AccountChecker>,
        ttl: Duration,
        max_entries: u64,
        cache_failures: bool,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            checker,
            cache,
            cache_failures,
        }
    }

    /// Check whether `key` grants access to `account`, consulting the cache
    /// before the provision service.
    ///
    /// `Ok(false)` covers both a fresh not-found answer and any cached
    /// negative decision. `Err` means the oracle could not answer right now;
    /// with `cache_failures` on, that failure is remembered as a denial for
    /// the TTL.
    pub async fn authorize(&self, account: &str, key: &AccessKey) -> Result<bool> {
        let scope = AccessScope::new(account, key);

        if let Some(decision) = self.cache.get(&scope).await {
            debug!(account = %account, key_name = %key.name, decision, "Permission cache hit");
            return Ok(decision);
        }

        match self.checker.check_account(account, key).await {
            Ok(decision) => {
                self.cache.insert(scope, decision).await;
                Ok(decision)
            }
            Err(err) => {
                if self.cache_failures {
                    self.cache.insert(scope, false).await;
                }
                Err(err)
            }
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Cached permission checks
    pub authorizer: Authorizer,
    /// Prefix stripped from request paths before classification
    pub path_prefix: String,
    /// Upstream target for allowed requests
    pub upstream: UpstreamConfig,
    /// Client used to relay allowed requests upstream
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(checker: Arc<dyn AccountChecker>, config: GateConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("http client: {e}")))?;

        Ok(Self {
            authorizer: Authorizer::new(checker, &config.auth_cache),
            path_prefix: config.path_prefix,
            upstream: config.upstream,
            http_client,
        })
    }
}
