//! # Rotation Configuration
//!
//! Job configuration loaded once from environment variables at startup.
//!
//! The resulting [`RotationConfig`] is immutable and passed by reference into the
//! token issuer and the secret reconciler. Nothing else in the crate reads the
//! process environment.

mod rotation;

pub use rotation::{parse_namespaces, ConfigError, RotationConfig};
