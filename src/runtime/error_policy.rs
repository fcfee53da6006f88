//! # Error Policy
//!
//! Reporting for fatal rotation errors. There is no retry anywhere in a run: every
//! error is logged with its context and an operator hint, then the process exits
//! non-zero.

use super::rotation::RotationError;
use crate::controller::reconciler::ReconcilerError;
use crate::provider::TokenError;
use tracing::error;

/// Log a fatal rotation error with context and remediation guidance
pub fn report_fatal(err: &RotationError) {
    match err {
        RotationError::Config(e) => {
            error!(error = %e, "configuration.error");
            error!("{}", e);
        }
        RotationError::Token(e) => {
            let message = token_failure_message(e);
            error!(
                error = %message,
                status = e.status_code().map(i64::from),
                "token.issue.error"
            );
            error!("{}", message);
            error!("{}", e.remediation());
        }
        RotationError::KubeClient(e) => {
            error!(error = %e, "kubernetes.client.error");
            error!("Failed to load Kubernetes config: {}", e);
            error!("Run inside a pod with a mounted ServiceAccount token, or provide a kubeconfig.");
        }
        RotationError::Reconcile(e) => {
            let target = e.target();
            error!(
                namespace = %target.namespace,
                secret = %target.secret_name,
                status = e.status_code().map(i64::from),
                error = %e,
                "secret.reconcile.error"
            );
            error!("Kubernetes API Error: {}", e);
            error!("{}", reconcile_remediation(e));
            error!("Remaining namespaces were not processed.");
        }
    }
}

/// Only failures that reached the API are reported as API errors. The body of an
/// HTTP error was already logged when it was received.
fn token_failure_message(err: &TokenError) -> String {
    match err {
        TokenError::HttpStatus { status, .. } => {
            format!("Error calling Crusoe API: HTTP {status}")
        }
        TokenError::UnreadableResponse { .. } => format!("Error calling Crusoe API: {err}"),
        _ => err.to_string(),
    }
}

fn reconcile_remediation(err: &ReconcilerError) -> String {
    let target = err.target();
    match err.status_code() {
        Some(401 | 403) => format!(
            "Verify the ServiceAccount may get, create, and update secrets in namespace '{}':\n  kubectl auth can-i update secrets -n {}",
            target.namespace, target.namespace
        ),
        Some(404) => format!("Namespace '{}' does not exist.", target.namespace),
        Some(409) => format!(
            "Secret '{target}' changed while it was being replaced. Re-run the rotation."
        ),
        Some(422) => format!(
            "Secret '{target}' exists with a different type. Delete it so it can be recreated as kubernetes.io/dockerconfigjson."
        ),
        _ => "Check the Kubernetes API server health and retry the job.".to_string(),
    }
}
