//! # Token Issuance Error Types
//!
//! Failures while signing or submitting the token request. Every variant is fatal
//! to the run and is raised before any cluster secret is touched.

use thiserror::Error;

/// Token issuance error
#[derive(Debug, Error)]
pub enum TokenError {
    /// The configured secret key is not valid URL-safe base64
    #[error("Secret key is not valid base64url: {0}")]
    InvalidSecretKey(#[source] base64::DecodeError),

    /// The HMAC could not be computed
    #[error("Failed to compute request signature: {0}")]
    Signing(String),

    /// The HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection failure or timeout before a response arrived
    #[error("Error calling Crusoe API at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A status line arrived but the body could not be read
    #[error("Failed to read Crusoe API response body (HTTP {status}): {source}")]
    UnreadableResponse {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status
    #[error("Crusoe API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The response body was not the expected JSON document
    #[error("Crusoe API response is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    /// The response parsed but carried no usable token
    #[error("API response did not contain a 'token' field")]
    MissingToken,
}

impl TokenError {
    /// HTTP status code reported by the API, if the request got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TokenError::HttpStatus { status, .. }
            | TokenError::UnreadableResponse { status, .. } => Some(*status),
            TokenError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Short operator hint for the failure
    pub fn remediation(&self) -> &'static str {
        match self {
            TokenError::InvalidSecretKey(_) | TokenError::Signing(_) => {
                "Verify CRUSOE_SECRET_KEY is the base64url secret key issued alongside CRUSOE_ACCESS_KEY."
            }
            TokenError::Client(_) => "The TLS stack could not be initialised. Check the container image.",
            TokenError::Transport { .. } | TokenError::UnreadableResponse { .. } => {
                "Check network egress to CRUSOE_BASE_ENDPOINT and that the endpoint is reachable within the timeout."
            }
            TokenError::HttpStatus { status: 401 | 403, .. } => {
                "The API rejected the signature. Verify the key pair is active and the node clock is in sync."
            }
            TokenError::HttpStatus { .. } => "Inspect the API response body above for details.",
            TokenError::MalformedResponse(_) | TokenError::MissingToken => {
                "The token endpoint answered with an unexpected document. Verify CRUSOE_BASE_ENDPOINT."
            }
        }
    }
}
