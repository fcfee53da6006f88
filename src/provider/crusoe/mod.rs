//! # Crusoe Registry Token Client
//!
//! Issues short-lived container registry tokens from the Crusoe Cloud API.
//!
//! Each request is signed with the account's HMAC secret key (see [`signing`]) and
//! sent exactly once. There are no retries: any failure aborts the rotation run
//! before cluster secrets are touched.

pub mod error;
pub mod requests;
pub mod signing;

pub use error::TokenError;
pub use signing::SigningRequest;

use crate::config::RotationConfig;
use crate::constants::TOKEN_REQUEST_TIMEOUT_SECS;
use crate::provider::{IssuedToken, TokenIssuer};
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, Instrument};
use zeroize::Zeroizing;

use self::requests::{CreateTokenRequest, CreateTokenResponse};
use self::signing::{authorization_header, TIMESTAMP_HEADER};

/// Crusoe Cloud registry token client
pub struct CrusoeTokenClient {
    http_client: Client,
    base_endpoint: String,
    access_key: Zeroizing<String>,
    secret_key: Zeroizing<String>,
}

impl std::fmt::Debug for CrusoeTokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrusoeTokenClient")
            .field("base_endpoint", &self.base_endpoint)
            .finish_non_exhaustive()
    }
}

impl CrusoeTokenClient {
    /// Create a client for the given endpoint and key pair
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Client`] if the HTTP client cannot be built.
    pub fn new(
        base_endpoint: &str,
        access_key: Zeroizing<String>,
        secret_key: Zeroizing<String>,
    ) -> Result<Self, TokenError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(TOKEN_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(TokenError::Client)?;

        Ok(Self {
            http_client,
            base_endpoint: base_endpoint.trim_end_matches('/').to_string(),
            access_key,
            secret_key,
        })
    }

    /// Create a client from the rotation configuration
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Client`] if the HTTP client cannot be built.
    pub fn from_config(config: &RotationConfig) -> Result<Self, TokenError> {
        Self::new(
            &config.base_endpoint,
            config.access_key.clone(),
            config.secret_key.clone(),
        )
    }

    /// Full URL of the token endpoint
    pub fn token_url(&self) -> String {
        format!(
            "{}{}{}",
            self.base_endpoint,
            signing::API_VERSION,
            signing::TOKENS_PATH
        )
    }

    /// Issue a token, signing the request as of `now`
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] for signing failures, transport failures, non-2xx
    /// responses, and responses without a token.
    pub async fn issue_token_at(
        &self,
        now: DateTime<Utc>,
        expires_at: &str,
        alias: Option<&str>,
    ) -> Result<IssuedToken, TokenError> {
        let signing_request = SigningRequest::create_token(now);
        let signature = signing_request.sign(&self.secret_key)?;
        let url = self.token_url();
        let body = CreateTokenRequest::new(expires_at.to_string(), alias);

        info!("Requesting new token from {}...", url);

        let response = self
            .http_client
            .post(&url)
            .header(TIMESTAMP_HEADER, &signing_request.timestamp)
            .header(AUTHORIZATION, authorization_header(&self.access_key, &signature))
            .json(&body)
            .send()
            .await
            .map_err(|source| TokenError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = Zeroizing::new(response.text().await.map_err(|source| {
            error!("API Response Status: {}", status.as_u16());
            TokenError::UnreadableResponse {
                status: status.as_u16(),
                source,
            }
        })?);

        if !status.is_success() {
            error!("API Response Status: {}", status.as_u16());
            error!("API Response Body: {}", text.as_str());
            return Err(TokenError::HttpStatus {
                status: status.as_u16(),
                body: text.to_string(),
            });
        }

        let parsed: CreateTokenResponse =
            serde_json::from_str(&text).map_err(TokenError::MalformedResponse)?;
        let token = parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or(TokenError::MissingToken)?;

        info!("Successfully generated new PAT token via API.");

        Ok(IssuedToken::new(
            token,
            parsed.expires_at.unwrap_or_else(|| expires_at.to_string()),
        ))
    }
}

#[async_trait::async_trait]
impl TokenIssuer for CrusoeTokenClient {
    async fn issue_token(
        &self,
        expires_at: &str,
        alias: Option<&str>,
    ) -> Result<IssuedToken, TokenError> {
        let span = tracing::info_span!("token.issue", endpoint = %self.base_endpoint);
        self.issue_token_at(Utc::now(), expires_at, alias)
            .instrument(span)
            .await
    }
}
