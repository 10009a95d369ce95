//! Provision service configuration.

use serde::{Deserialize, Serialize};

/// Provision client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionConfig {
    /// Provision service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Key-check request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://api-provision:8070".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
