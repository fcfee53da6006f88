//! # Request and Response Types
//!
//! JSON payloads exchanged with the Crusoe registry token endpoint
//! (`POST /v1alpha5/ccr/tokens`).

use serde::{Deserialize, Serialize};

/// Request body for issuing a registry token
#[derive(Debug, Serialize)]
pub struct CreateTokenRequest {
    /// Expiry of the new token, `YYYY-MM-DDTHH:MM:SSZ`
    pub expires_at: String,
    /// Optional human-readable alias, omitted when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl CreateTokenRequest {
    /// Create a request, dropping an empty alias
    pub fn new(expires_at: String, alias: Option<&str>) -> Self {
        Self {
            expires_at,
            alias: alias.filter(|a| !a.is_empty()).map(str::to_string),
        }
    }
}

/// Response body from the token endpoint
///
/// Only `token` is required by the rotator; other fields are informational.
#[derive(Deserialize)]
pub struct CreateTokenResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl std::fmt::Debug for CreateTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateTokenResponse")
            .field("expires_at", &self.expires_at)
            .field("alias", &self.alias)
            .finish_non_exhaustive()
    }
}
