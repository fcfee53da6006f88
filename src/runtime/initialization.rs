//! # Initialization
//!
//! Process setup for the rotation job: rustls crypto provider, tracing subscriber,
//! and the Kubernetes client.

use crate::constants::DEFAULT_LOG_FILTER;
use anyhow::Result;
use kube::Client;
use tracing::{debug, info};

/// Initialize process-wide state
///
/// Must run before any TLS client is built.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed.
pub fn initialize() -> Result<()> {
    // rustls 0.23+ needs a process default when no provider is selected via features
    let provider_preinstalled = rustls::crypto::ring::default_provider()
        .install_default()
        .is_err();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))?;

    if provider_preinstalled {
        debug!("rustls crypto provider already installed");
    }

    info!("Starting Registry Token Rotator v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Create a Kubernetes client
///
/// Uses the in-cluster service account when running in a pod and falls back to the
/// local kubeconfig otherwise.
///
/// # Errors
///
/// Returns the [`kube::Error`] from client inference.
pub async fn create_kube_client() -> Result<Client, kube::Error> {
    let client = Client::try_default().await?;
    info!("Loaded Kubernetes client configuration.");
    Ok(client)
}
