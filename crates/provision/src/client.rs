//! Provision service client: the key-check call behind every permission
//! decision.

use std::time::Duration;

use async_trait::async_trait;
use gate_core::{AccessKey, Error, Result};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ProvisionConfig;

/// Answers whether an access key is valid for an account.
///
/// Implemented by [`ProvisionClient`] in production and by in-memory mocks in
/// tests. `Ok(true)` means authorized, `Ok(false)` means the account/key pair
/// was not found, `Err` means the authority could not answer.
#[async_trait]
pub trait AccountChecker: Send + Sync {
    async fn check_account(&self, account: &str, key: &AccessKey) -> Result<bool>;
}

/// HTTP client for the provision service's `/keyCheck/{account}` endpoint.
///
/// A single attempt per call; there is no retry or backoff. A failed lookup
/// is final for the request that issued it.
#[derive(Clone)]
pub struct ProvisionClient {
    base_url: String,
    http: reqwest::Client,
}

impl ProvisionClient {
    /// Creates a new provision client.
    pub fn new(config: &ProvisionConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::config(format!("provision base_url: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("http client: {e}")))?;

        info!(
            base_url = %base,
            timeout_secs = config.timeout_secs,
            "Created provision client"
        );

        Ok(Self {
            base_url: base.as_str().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn key_check_url(&self, account: &str) -> String {
        format!("{}/keyCheck/{}", self.base_url, account)
    }
}

#[async_trait]
impl AccountChecker for ProvisionClient {
    async fn check_account(&self, account: &str, key: &AccessKey) -> Result<bool> {
        let url = self.key_check_url(account);

        debug!(url = %url, key_name = %key.name, "Key check");

        let response = self.http.post(&url).json(key).send().await.map_err(|e| {
            warn!(account = %account, error = %e, "Provision request failed");
            Error::oracle_unreachable(e.to_string())
        })?;

        decision_for_status(response.status().as_u16(), account)
    }
}

/// Map a key-check response status to a permission decision.
fn decision_for_status(status: u16, account: &str) -> Result<bool> {
    match status {
        200 => Ok(true),
        404 => {
            debug!(account = %account, "Account not found");
            Ok(false)
        }
        status => Err(Error::OracleStatus {
            account: account.to_string(),
            status,
        }),
    }
}
