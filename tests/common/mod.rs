//! Shared test fixtures: an in-memory secret store, a canned token issuer, and
//! configuration helpers.

#![allow(dead_code, reason = "Not every integration test binary uses every helper")]

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use registry_token_rotator::controller::reconciler::{
    RemoteSecretState, SecretStore, SecretTarget,
};
use registry_token_rotator::provider::{IssuedToken, TokenError, TokenIssuer};
use registry_token_rotator::RotationConfig;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// URL-safe base64 of `b"k" * 32` with padding stripped
pub const SECRET_KEY: &str = "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2s";

/// Cluster calls recorded by [`MemorySecretStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Lookup(String),
    Create(String),
    Replace(String),
}

impl StoreCall {
    pub fn namespace(&self) -> &str {
        match self {
            StoreCall::Lookup(ns) | StoreCall::Create(ns) | StoreCall::Replace(ns) => ns,
        }
    }
}

/// In-memory stand-in for the Kubernetes secrets API
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<BTreeMap<(String, String), Secret>>,
    lookup_failures: Mutex<HashMap<String, u16>>,
    write_failures: Mutex<HashMap<String, u16>>,
    calls: Mutex<Vec<StoreCall>>,
    version: Mutex<u64>,
}

pub fn api_error(code: u16, reason: &str) -> kube::Error {
    kube::Error::Api(kube::core::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("simulated {reason}"),
        reason: reason.to_string(),
        code,
    })
}

impl MemorySecretStore {
    /// Make every lookup in `namespace` fail with `code`
    pub fn fail_lookups_in(&self, namespace: &str, code: u16) {
        self.lookup_failures
            .lock()
            .unwrap()
            .insert(namespace.to_string(), code);
    }

    /// Make every create/replace in `namespace` fail with `code`
    pub fn fail_writes_in(&self, namespace: &str, code: u16) {
        self.write_failures
            .lock()
            .unwrap()
            .insert(namespace.to_string(), code);
    }

    /// Pre-populate a secret, as if left by an earlier run
    pub fn seed(&self, target: &SecretTarget, mut secret: Secret) {
        secret.metadata.resource_version = Some(self.bump_version());
        self.secrets.lock().unwrap().insert(key(target), secret);
    }

    pub fn get(&self, target: &SecretTarget) -> Option<Secret> {
        self.secrets.lock().unwrap().get(&key(target)).cloned()
    }

    pub fn len(&self) -> usize {
        self.secrets.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn bump_version(&self) -> String {
        let mut version = self.version.lock().unwrap();
        *version += 1;
        version.to_string()
    }

    fn write_failure(&self, namespace: &str) -> Option<kube::Error> {
        self.write_failures
            .lock()
            .unwrap()
            .get(namespace)
            .map(|code| api_error(*code, "WriteRejected"))
    }
}

fn key(target: &SecretTarget) -> (String, String) {
    (target.namespace.clone(), target.secret_name.clone())
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn lookup(&self, target: &SecretTarget) -> Result<RemoteSecretState, kube::Error> {
        self.record(StoreCall::Lookup(target.namespace.clone()));
        if let Some(code) = self.lookup_failures.lock().unwrap().get(&target.namespace) {
            return Err(api_error(*code, "LookupRejected"));
        }
        Ok(match self.get(target) {
            Some(secret) => RemoteSecretState::Present(Box::new(secret)),
            None => RemoteSecretState::Absent,
        })
    }

    async fn create(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error> {
        self.record(StoreCall::Create(target.namespace.clone()));
        if let Some(err) = self.write_failure(&target.namespace) {
            return Err(err);
        }
        if self.get(target).is_some() {
            return Err(api_error(409, "AlreadyExists"));
        }
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(self.bump_version());
        self.secrets.lock().unwrap().insert(key(target), stored);
        Ok(())
    }

    async fn replace(&self, target: &SecretTarget, secret: &Secret) -> Result<(), kube::Error> {
        self.record(StoreCall::Replace(target.namespace.clone()));
        if let Some(err) = self.write_failure(&target.namespace) {
            return Err(err);
        }
        let Some(current) = self.get(target) else {
            return Err(api_error(404, "NotFound"));
        };
        if secret.metadata.resource_version.is_some()
            && secret.metadata.resource_version != current.metadata.resource_version
        {
            return Err(api_error(409, "Conflict"));
        }
        let mut stored = secret.clone();
        stored.metadata.resource_version = Some(self.bump_version());
        self.secrets.lock().unwrap().insert(key(target), stored);
        Ok(())
    }
}

/// Token issuer returning a canned result and recording its arguments
pub struct StaticTokenIssuer {
    token: Option<String>,
    expires_at: Option<String>,
    pub requests: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticTokenIssuer {
    pub fn returning(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            expires_at: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Report `expires_at` instead of echoing the requested expiry
    pub fn expiring_at(mut self, expires_at: &str) -> Self {
        self.expires_at = Some(expires_at.to_string());
        self
    }

    pub fn failing() -> Self {
        Self {
            token: None,
            expires_at: None,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn issue_token(
        &self,
        expires_at: &str,
        alias: Option<&str>,
    ) -> Result<IssuedToken, TokenError> {
        self.requests
            .lock()
            .unwrap()
            .push((expires_at.to_string(), alias.map(str::to_string)));
        match &self.token {
            Some(token) => Ok(IssuedToken::new(
                token.clone(),
                self.expires_at
                    .clone()
                    .unwrap_or_else(|| expires_at.to_string()),
            )),
            None => Err(TokenError::HttpStatus {
                status: 401,
                body: "invalid signature".to_string(),
            }),
        }
    }
}

/// Configuration for the given namespaces with otherwise fixed test values
pub fn test_config(namespaces: &str) -> RotationConfig {
    let env = HashMap::from([
        ("TARGET_NAMESPACE", namespaces.to_string()),
        ("TARGET_SECRET_NAME", "crusoe-pull".to_string()),
        ("REGISTRY_URL", "registry.us-east1.crusoecloud.com".to_string()),
        ("REGISTRY_USERNAME", "robot".to_string()),
        ("CRUSOE_ACCESS_KEY", "AK-TEST".to_string()),
        ("CRUSOE_SECRET_KEY", SECRET_KEY.to_string()),
        ("TOKEN_ALIAS", "nightly".to_string()),
    ]);
    RotationConfig::from_lookup(|name| env.get(name).cloned())
        .expect("test configuration should be valid")
}
