//! # Registry Token Rotator
//!
//! Rotates a Crusoe Cloud container registry token into Kubernetes image-pull secrets.
//!
//! A run performs two strictly ordered steps:
//!
//! 1. **Issue** - request a short-lived registry token from the Crusoe API, signing the
//!    request with the account's HMAC secret key
//! 2. **Reconcile** - write the token as a `kubernetes.io/dockerconfigjson` secret into
//!    every target namespace, creating or replacing it as needed
//!
//! The first fatal error stops the run. Secrets already written in earlier namespaces
//! are left in place.

pub mod config;
pub mod constants;
pub mod controller;
pub mod provider;
pub mod runtime;

pub use config::RotationConfig;
pub use controller::reconciler::{ReconcileOutcome, SecretReconciler, SecretTarget};
pub use provider::{CrusoeTokenClient, IssuedToken, TokenIssuer};
