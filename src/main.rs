//! Search gate
//!
//! Authorization gate in front of a multi-tenant Elasticsearch reverse proxy:
//! - Basic-auth access keys checked against the provision service
//! - Allow-list request screening (index `_mapping` reads and `_msearch`)
//! - Time-bounded caching of permission decisions
//! - Pass-through forwarding of allowed requests

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::state::GateConfig;
use api::{router, AppState};
use provision_client::{ProvisionClient, ProvisionConfig};
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Provision service for access key checks
    #[serde(default)]
    provision: ProvisionConfig,

    #[serde(default)]
    gate: GateConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            provision: ProvisionConfig::default(),
            gate: GateConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // rustls 0.23+ requires explicit crypto provider selection
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting search gate v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        path_prefix = %config.gate.path_prefix,
        upstream = %format!("{}://{}", config.gate.upstream.scheme, config.gate.upstream.host),
        provision = %config.provision.base_url,
        "Loaded gate config"
    );

    let checker = Arc::new(
        ProvisionClient::new(&config.provision).context("Failed to create provision client")?,
    );

    let state =
        AppState::new(checker, config.gate.clone()).context("Failed to build application state")?;

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables (GATE_GATE__PATH_PREFIX etc.)
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("GATE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat overrides for the deployment's conventional environment variables
    if let Ok(host) = std::env::var("ELASTICSEARCH_HOST") {
        config.gate.upstream.host = host;
    }
    if let Ok(scheme) = std::env::var("ELASTICSEARCH_SCHEME") {
        config.gate.upstream.scheme = scheme;
    }
    if let Ok(prefix) = std::env::var("ELASTICSEARCH_PROXY_PATH") {
        config.gate.path_prefix = prefix;
    }
    if let Ok(provision) = std::env::var("PROVISION_SERVICE") {
        config.provision.base_url = provision;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
