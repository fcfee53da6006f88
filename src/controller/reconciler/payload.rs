//! # Pull Secret Payload
//!
//! Builds the Docker config JSON stored in `kubernetes.io/dockerconfigjson` secrets.
//!
//! ```json
//! {"auths": {"<registry>": {"username": "...", "password": "<token>", "auth": "<base64(user:token)>"}}}
//! ```

use crate::constants::{DOCKER_CONFIG_JSON_KEY, DOCKER_CONFIG_JSON_TYPE};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::SecretTarget;

/// Top-level Docker config document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
    pub auths: BTreeMap<String, DockerAuth>,
}

/// Credentials for one registry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerAuth {
    pub username: String,
    pub password: String,
    pub auth: String,
}

impl std::fmt::Debug for DockerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Registry credential to be written into every target namespace
#[derive(Clone, Copy)]
pub struct PullSecretPayload<'a> {
    pub registry_url: &'a str,
    pub username: &'a str,
    pub token: &'a str,
}

impl std::fmt::Debug for PullSecretPayload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullSecretPayload")
            .field("registry_url", &self.registry_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl<'a> PullSecretPayload<'a> {
    pub fn new(registry_url: &'a str, username: &'a str, token: &'a str) -> Self {
        Self {
            registry_url,
            username,
            token,
        }
    }

    /// `base64(username:token)`
    pub fn basic_auth(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.token))
    }

    pub fn docker_config(&self) -> DockerConfig {
        DockerConfig {
            auths: BTreeMap::from([(
                self.registry_url.to_string(),
                DockerAuth {
                    username: self.username.to_string(),
                    password: self.token.to_string(),
                    auth: self.basic_auth(),
                },
            )]),
        }
    }

    /// Serialized Docker config JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.docker_config())
    }

    /// Docker config JSON as it appears base64-encoded under `.dockerconfigjson`
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encoded(&self) -> Result<String, serde_json::Error> {
        Ok(STANDARD.encode(self.to_json()?))
    }

    /// Build the full secret body for a target
    ///
    /// `ByteString` data is base64-encoded by the Kubernetes client on the wire.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_secret(&self, target: &SecretTarget) -> Result<Secret, serde_json::Error> {
        Ok(Secret {
            metadata: ObjectMeta {
                name: Some(target.secret_name.clone()),
                namespace: Some(target.namespace.clone()),
                ..Default::default()
            },
            type_: Some(DOCKER_CONFIG_JSON_TYPE.to_string()),
            data: Some(BTreeMap::from([(
                DOCKER_CONFIG_JSON_KEY.to_string(),
                ByteString(self.to_json()?),
            )])),
            ..Default::default()
        })
    }
}

/// Parse the Docker config JSON out of a stored secret
pub fn docker_config_from_secret(secret: &Secret) -> Option<DockerConfig> {
    let bytes = secret.data.as_ref()?.get(DOCKER_CONFIG_JSON_KEY)?;
    serde_json::from_slice(&bytes.0).ok()
}
