//! # Reconciler Types
//!
//! Targets, outcomes, and errors shared by the secret reconciler.

use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;

/// One image-pull secret to keep in sync
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretTarget {
    pub namespace: String,
    pub secret_name: String,
}

impl SecretTarget {
    pub fn new(namespace: String, secret_name: String) -> Self {
        Self {
            namespace,
            secret_name,
        }
    }
}

impl std::fmt::Display for SecretTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.secret_name)
    }
}

/// State of the target secret in the cluster, read right before mutating it
#[derive(Debug, Clone)]
pub enum RemoteSecretState {
    Present(Box<Secret>),
    Absent,
}

/// What reconciliation did to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
}

impl ReconcileOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Created => "created",
            ReconcileOutcome::Updated => "updated",
        }
    }
}

impl std::fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cluster call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretOperation {
    Read,
    Create,
    Replace,
}

impl std::fmt::Display for SecretOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SecretOperation::Read => "read",
            SecretOperation::Create => "create",
            SecretOperation::Replace => "replace",
        })
    }
}

/// Reconciliation error. Any of these aborts processing of the remaining namespaces.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Failed to encode pull secret for '{target}': {source}")]
    Encode {
        target: SecretTarget,
        #[source]
        source: serde_json::Error,
    },

    #[error("Kubernetes API error during {operation} of secret '{target}': {source}")]
    Kube {
        operation: SecretOperation,
        target: SecretTarget,
        #[source]
        source: kube::Error,
    },
}

impl ReconcilerError {
    /// Target the error belongs to
    pub fn target(&self) -> &SecretTarget {
        match self {
            ReconcilerError::Encode { target, .. } | ReconcilerError::Kube { target, .. } => target,
        }
    }

    /// HTTP status code from the Kubernetes API, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ReconcilerError::Kube {
                source: kube::Error::Api(response),
                ..
            } => Some(response.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_display() {
        let target = SecretTarget::new("team-a".to_string(), "pull".to_string());
        assert_eq!(target.to_string(), "team-a/pull");
    }

    #[test]
    fn test_status_code_from_api_error() {
        let err = ReconcilerError::Kube {
            operation: SecretOperation::Replace,
            target: SecretTarget::new("team-a".to_string(), "pull".to_string()),
            source: kube::Error::Api(kube::core::ErrorResponse {
                status: "Failure".to_string(),
                message: "secrets \"pull\" is forbidden".to_string(),
                reason: "Forbidden".to_string(),
                code: 403,
            }),
        };
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.target().namespace, "team-a");
        assert!(err.to_string().contains("replace of secret 'team-a/pull'"));
    }
}
