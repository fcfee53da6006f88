//! # Token Providers
//!
//! Sources of registry credentials. The rotator depends on the [`TokenIssuer`]
//! trait so the run pipeline can be exercised without a live provider.
//!
//! - `crusoe`: Crusoe Cloud Container Registry tokens (HMAC-signed REST API)

pub mod crusoe;

pub use crusoe::{CrusoeTokenClient, TokenError};

use async_trait::async_trait;
use zeroize::Zeroizing;

/// A freshly issued registry token
///
/// Held in memory for the duration of a run only. The value is zeroized on drop
/// and never printed by `Debug`.
pub struct IssuedToken {
    value: Zeroizing<String>,
    expires_at: String,
}

impl IssuedToken {
    pub fn new(value: String, expires_at: String) -> Self {
        Self {
            value: Zeroizing::new(value),
            expires_at,
        }
    }

    /// The token itself, used as the registry password
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Expiry reported for the token
    pub fn expires_at(&self) -> &str {
        &self.expires_at
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Issues registry tokens
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Request a new token expiring at `expires_at`, optionally tagged with `alias`
    async fn issue_token(
        &self,
        expires_at: &str,
        alias: Option<&str>,
    ) -> Result<IssuedToken, TokenError>;
}
