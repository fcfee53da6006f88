//! # Rotation Run
//!
//! One rotation: issue a single token, then write it into every target namespace.
//!
//! The two phases are strictly ordered. Token issuance finishes (or fails) before
//! the cluster is contacted, so a provider failure never leaves secrets half-updated.

use crate::config::{ConfigError, RotationConfig};
use crate::controller::reconciler::{
    KubeSecretStore, PullSecretPayload, ReconcileOutcome, ReconcilerError, SecretReconciler,
    SecretTarget,
};
use crate::provider::crusoe::signing::format_timestamp;
use crate::provider::{CrusoeTokenClient, IssuedToken, TokenError, TokenIssuer};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::initialization::create_kube_client;

/// Fatal rotation error
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token issuance failed: {0}")]
    Token(#[from] TokenError),

    #[error("Failed to create Kubernetes client: {0}")]
    KubeClient(#[source] kube::Error),

    #[error("Secret reconciliation failed: {0}")]
    Reconcile(#[from] ReconcilerError),
}

/// Result of a completed rotation
#[derive(Debug, Clone, Default)]
pub struct RotationSummary {
    pub outcomes: Vec<(SecretTarget, ReconcileOutcome)>,
    /// Expiry of the token now stored in every target, as reported by the provider
    pub token_expires_at: String,
}

impl RotationSummary {
    pub fn created(&self) -> usize {
        self.count(ReconcileOutcome::Created)
    }

    pub fn updated(&self) -> usize {
        self.count(ReconcileOutcome::Updated)
    }

    fn count(&self, wanted: ReconcileOutcome) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == wanted)
            .count()
    }
}

/// Token expiry `hours` after `now`, rendered `YYYY-MM-DDTHH:MM:SSZ`
///
/// Returns `None` when the expiry falls outside the representable date range.
pub fn expiry_timestamp(now: DateTime<Utc>, hours: u32) -> Option<String> {
    let lifetime = Duration::try_hours(i64::from(hours))?;
    now.checked_add_signed(lifetime).map(format_timestamp)
}

/// Issue the token for this run
///
/// # Errors
///
/// Returns [`RotationError::Config`] if the expiry cannot be represented and
/// [`RotationError::Token`] if the provider call fails.
pub async fn issue_rotation_token(
    config: &RotationConfig,
    issuer: &dyn TokenIssuer,
    now: DateTime<Utc>,
) -> Result<IssuedToken, RotationError> {
    let expires_at = expiry_timestamp(now, config.token_lifetime_hours).ok_or_else(|| {
        ConfigError::Invalid {
            name: "TOKEN_EXPIRATION_HOURS",
            value: config.token_lifetime_hours.to_string(),
            reason: "token expiry is out of range".to_string(),
        }
    })?;
    info!("New token will expire at: {}", expires_at);

    let token = issuer
        .issue_token(&expires_at, config.token_alias.as_deref())
        .await?;
    if token.expires_at() != expires_at {
        info!("Provider set token expiry to: {}", token.expires_at());
    }
    Ok(token)
}

/// Write an issued token into every configured namespace, in order
///
/// # Errors
///
/// Returns [`RotationError::Reconcile`] for the first namespace that fails.
/// Namespaces after it are not touched.
pub async fn apply_token(
    config: &RotationConfig,
    reconciler: &SecretReconciler,
    token: &IssuedToken,
) -> Result<RotationSummary, RotationError> {
    let payload = PullSecretPayload::new(
        &config.registry_url,
        &config.registry_username,
        token.value(),
    );
    let outcomes = reconciler
        .reconcile_all(&config.targets(), &payload)
        .await?;
    Ok(RotationSummary {
        outcomes,
        token_expires_at: token.expires_at().to_string(),
    })
}

/// Run a full rotation against the Crusoe API and the current Kubernetes cluster
///
/// # Errors
///
/// Returns the first fatal [`RotationError`].
pub async fn run_rotation(config: &RotationConfig) -> Result<RotationSummary, RotationError> {
    info!(
        "Starting token rotation for secret '{}' in namespaces: {:?}.",
        config.secret_name, config.namespaces
    );

    let issuer = CrusoeTokenClient::from_config(config)?;
    let token = issue_rotation_token(config, &issuer, Utc::now()).await?;

    let client = create_kube_client()
        .await
        .map_err(RotationError::KubeClient)?;
    let reconciler = SecretReconciler::new(Arc::new(KubeSecretStore::new(client)));

    let summary = apply_token(config, &reconciler, &token).await?;
    info!(
        created = summary.created(),
        updated = summary.updated(),
        expires_at = %summary.token_expires_at,
        "Token rotation complete."
    );
    Ok(summary)
}
