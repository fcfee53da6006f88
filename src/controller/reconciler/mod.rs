//! # Secret Reconciler
//!
//! Upserts the registry pull secret into each target namespace.
//!
//! Every target is looked up immediately before it is written: a present secret is
//! replaced in place, an absent one is created. Targets are processed strictly in
//! order and the first failure stops the run, leaving earlier writes in place.
//!
//! ## Module Structure
//!
//! - `payload.rs` - Docker config JSON and secret body construction
//! - `store.rs` - Cluster secret store trait and Kubernetes implementation
//! - `types.rs` - Targets, outcomes, and errors

mod payload;
mod store;
mod types;

pub use payload::{docker_config_from_secret, DockerAuth, DockerConfig, PullSecretPayload};
pub use store::{is_not_found, KubeSecretStore, SecretStore};
pub use types::{
    ReconcileOutcome, ReconcilerError, RemoteSecretState, SecretOperation, SecretTarget,
};

use std::sync::Arc;
use tracing::{info, Instrument};

/// Applies one pull secret payload to cluster secrets
#[derive(Clone)]
pub struct SecretReconciler {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for SecretReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretReconciler").finish_non_exhaustive()
    }
}

impl SecretReconciler {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Create or replace the secret for a single target
    ///
    /// # Errors
    ///
    /// Returns a [`ReconcilerError`] for any cluster failure other than the
    /// not-found lookup that selects the create branch.
    pub async fn reconcile(
        &self,
        target: &SecretTarget,
        payload: &PullSecretPayload<'_>,
    ) -> Result<ReconcileOutcome, ReconcilerError> {
        let mut secret = payload
            .to_secret(target)
            .map_err(|source| ReconcilerError::Encode {
                target: target.clone(),
                source,
            })?;

        let kube_error = move |operation: SecretOperation| {
            move |source: kube::Error| ReconcilerError::Kube {
                operation,
                target: target.clone(),
                source,
            }
        };

        match self
            .store
            .lookup(target)
            .await
            .map_err(kube_error(SecretOperation::Read))?
        {
            RemoteSecretState::Present(existing) => {
                info!(
                    "Secret '{}' exists in namespace '{}'. Updating...",
                    target.secret_name, target.namespace
                );
                // Replace only the version we just read
                secret.metadata.resource_version = existing.metadata.resource_version;
                self.store
                    .replace(target, &secret)
                    .await
                    .map_err(kube_error(SecretOperation::Replace))?;
                info!(
                    "Secret updated successfully in namespace '{}'.",
                    target.namespace
                );
                Ok(ReconcileOutcome::Updated)
            }
            RemoteSecretState::Absent => {
                info!(
                    "Secret '{}' not found in namespace '{}'. Creating...",
                    target.secret_name, target.namespace
                );
                self.store
                    .create(target, &secret)
                    .await
                    .map_err(kube_error(SecretOperation::Create))?;
                info!(
                    "Secret created successfully in namespace '{}'.",
                    target.namespace
                );
                Ok(ReconcileOutcome::Created)
            }
        }
    }

    /// Reconcile every target in order, stopping at the first error
    ///
    /// Targets reconciled before the failure keep their new content.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReconcilerError`] encountered.
    pub async fn reconcile_all(
        &self,
        targets: &[SecretTarget],
        payload: &PullSecretPayload<'_>,
    ) -> Result<Vec<(SecretTarget, ReconcileOutcome)>, ReconcilerError> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let span = tracing::info_span!(
                "secret.reconcile",
                namespace = %target.namespace,
                secret = %target.secret_name
            );
            let outcome = self.reconcile(target, payload).instrument(span).await?;
            outcomes.push((target.clone(), outcome));
        }
        Ok(outcomes)
    }
}
