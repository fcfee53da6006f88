//! # Cluster Secret Store
//!
//! The reconciler's view of the cluster: look up, create, and replace a namespaced
//! secret. [`KubeSecretStore`] talks to the Kubernetes API; tests substitute an
//! in-memory implementation.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::debug;

use super::types::{RemoteSecretState, SecretTarget};

/// Secret operations needed for an upsert
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the target secret. A missing secret is `Ok(RemoteSecretState::Absent)`, not an error.
    async fn lookup(&self, target: &SecretTarget) -> Result<RemoteSecretState, kube::Error>;

    async fn create(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error>;

    async fn replace(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error>;
}

/// Returns true for a Kubernetes API 404
pub fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 404)
}

/// [`SecretStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn lookup(&self, target: &SecretTarget) -> Result<RemoteSecretState, kube::Error> {
        match self.api(&target.namespace).get(&target.secret_name).await {
            Ok(secret) => Ok(RemoteSecretState::Present(Box::new(secret))),
            Err(e) if is_not_found(&e) => {
                debug!("Secret '{}' not found", target);
                Ok(RemoteSecretState::Absent)
            }
            Err(e) => Err(e),
        }
    }

    async fn create(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error> {
        self.api(&target.namespace)
            .create(&PostParams::default(), secret)
            .await?;
        Ok(())
    }

    async fn replace(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error> {
        self.api(&target.namespace)
            .replace(&target.secret_name, &PostParams::default(), secret)
            .await?;
        Ok(())
    }
}
