//! # Registry Token Rotator
//!
//! Batch job that issues a fresh Crusoe Cloud registry token and writes it into the
//! image-pull secret of every configured namespace.
//!
//! ## Usage
//!
//! Intended to run as a Kubernetes `CronJob`. All settings come from the environment:
//!
//! - `TARGET_NAMESPACE` - comma-separated namespaces (required)
//! - `TARGET_SECRET_NAME` - secret name (default `crusoe-image-pull-secrets`)
//! - `REGISTRY_URL`, `REGISTRY_USERNAME` - registry credential identity (required)
//! - `CRUSOE_ACCESS_KEY`, `CRUSOE_SECRET_KEY` - API key pair (required)
//! - `TOKEN_EXPIRATION_HOURS` - token lifetime (default 12)
//! - `TOKEN_ALIAS` - optional token alias
//! - `CRUSOE_BASE_ENDPOINT` - API endpoint (default `https://api.crusoecloud.com`)
//!
//! Exits non-zero on any fatal error.

use anyhow::{Context, Result};
use registry_token_rotator::runtime::{initialize, report_fatal, run_rotation, RotationError};
use registry_token_rotator::RotationConfig;

#[tokio::main]
async fn main() -> Result<()> {
    initialize()?;

    let outcome = match RotationConfig::from_env() {
        Ok(config) => run_rotation(&config).await.map(|_| ()),
        Err(e) => Err(RotationError::from(e)),
    };

    if let Err(e) = outcome {
        report_fatal(&e);
        return Err(e).context("Token rotation failed");
    }

    Ok(())
}
