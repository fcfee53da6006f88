//! # Request Signing
//!
//! HMAC-SHA256 request signatures for the Crusoe Cloud API.
//!
//! The server recomputes the signature over the same canonical payload, so the
//! payload layout must be reproduced byte for byte:
//!
//! ```text
//! {api_version}{path}\n{query}\n{verb}\n{timestamp}\n
//! ```

use super::error::TokenError;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Lenient base64url decoder for secret keys
///
/// Accepts non-zero trailing bits in the final symbol and either padding style, so
/// any key written in the URL-safe alphabet with a valid length decodes.
const SECRET_KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// API version prefix for every signed request
pub const API_VERSION: &str = "/v1alpha5";

/// Path of the registry token endpoint
pub const TOKENS_PATH: &str = "/ccr/tokens";

/// Version of the signing scheme carried in the `Authorization` header
pub const SIGNATURE_VERSION: &str = "1.0";

/// Header carrying the signed timestamp
pub const TIMESTAMP_HEADER: &str = "X-Crusoe-Timestamp";

/// Canonical request description that gets signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub api_version: String,
    pub path: String,
    pub verb: String,
    pub query: String,
    pub timestamp: String,
}

impl SigningRequest {
    /// Signing request for `POST /ccr/tokens` at the given instant
    pub fn create_token(now: DateTime<Utc>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            path: TOKENS_PATH.to_string(),
            verb: "POST".to_string(),
            query: String::new(),
            timestamp: format_timestamp(now),
        }
    }

    /// The exact byte payload covered by the signature
    pub fn payload(&self) -> String {
        format!(
            "{}{}\n{}\n{}\n{}\n",
            self.api_version, self.path, self.query, self.verb, self.timestamp
        )
    }

    /// Sign the payload with a base64url secret key
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidSecretKey`] if the key is not valid base64url.
    pub fn sign(&self, secret_key: &str) -> Result<String, TokenError> {
        let key = decode_secret_key(secret_key)?;
        sign_payload(&self.payload(), &key)
    }
}

/// Render a timestamp as `YYYY-MM-DDTHH:MM:SSZ`, dropping sub-second precision
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Restore `=` padding so the length is a multiple of 4
pub fn pad_base64(encoded: &str) -> String {
    let missing = (4 - encoded.len() % 4) % 4;
    let mut padded = String::with_capacity(encoded.len() + missing);
    padded.push_str(encoded);
    padded.push_str(&"=".repeat(missing));
    padded
}

/// Decode a URL-safe base64 secret key whose padding may have been stripped
///
/// # Errors
///
/// Returns [`TokenError::InvalidSecretKey`] if the key is not valid base64url.
pub fn decode_secret_key(secret_key: &str) -> Result<Zeroizing<Vec<u8>>, TokenError> {
    let padded = Zeroizing::new(pad_base64(secret_key.trim()));
    SECRET_KEY_ENGINE
        .decode(padded.as_bytes())
        .map(Zeroizing::new)
        .map_err(TokenError::InvalidSecretKey)
}

/// HMAC-SHA256 over `payload`, encoded as unpadded URL-safe base64
///
/// # Errors
///
/// Returns [`TokenError::Signing`] if the MAC cannot be keyed.
pub fn sign_payload(payload: &str, key: &[u8]) -> Result<String, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| TokenError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

/// Value of the `Authorization` header
pub fn authorization_header(access_key: &str, signature: &str) -> String {
    format!("Bearer {SIGNATURE_VERSION}:{access_key}:{signature}")
}
