//! # Rotation Settings
//!
//! Environment-backed settings for a single rotation run.

use crate::constants::{DEFAULT_BASE_ENDPOINT, DEFAULT_SECRET_NAME, DEFAULT_TOKEN_EXPIRATION_HOURS};
use crate::controller::reconciler::SecretTarget;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Configuration errors. All of them are fatal before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: '{value}' ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("No namespaces specified in TARGET_NAMESPACE")]
    NoNamespaces,
}

/// Settings for one rotation run
///
/// Secret material is held in zeroizing buffers and left out of `Debug` output.
#[derive(Clone)]
pub struct RotationConfig {
    /// Namespaces receiving the image-pull secret, in processing order
    pub namespaces: Vec<String>,
    /// Name of the image-pull secret in every namespace
    pub secret_name: String,
    /// Registry host the credential is valid for
    pub registry_url: String,
    /// Registry login name stored alongside the token
    pub registry_username: String,
    /// Lifetime of the issued token (hours)
    pub token_lifetime_hours: u32,
    /// Optional alias attached to the issued token
    pub token_alias: Option<String>,
    /// Crusoe API access key
    pub access_key: Zeroizing<String>,
    /// Crusoe API secret key (base64url, padding possibly stripped)
    pub secret_key: Zeroizing<String>,
    /// Crusoe API base endpoint, without trailing slash
    pub base_endpoint: String,
}

impl std::fmt::Debug for RotationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationConfig")
            .field("namespaces", &self.namespaces)
            .field("secret_name", &self.secret_name)
            .field("registry_url", &self.registry_url)
            .field("registry_username", &self.registry_username)
            .field("token_lifetime_hours", &self.token_lifetime_hours)
            .field("token_alias", &self.token_alias)
            .field("base_endpoint", &self.base_endpoint)
            .finish_non_exhaustive()
    }
}

impl RotationConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is absent or a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Empty values are treated the same as absent ones.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a required variable is absent or a value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let namespaces = parse_namespaces(&env.required("TARGET_NAMESPACE", false)?);
        if namespaces.is_empty() {
            return Err(ConfigError::NoNamespaces);
        }

        let secret_name = env.with_default("TARGET_SECRET_NAME", DEFAULT_SECRET_NAME);
        let registry_url = env.required("REGISTRY_URL", false)?;

        let token_lifetime_hours = match env.optional("TOKEN_EXPIRATION_HOURS", false) {
            Some(raw) => parse_lifetime_hours(&raw)?,
            None => DEFAULT_TOKEN_EXPIRATION_HOURS,
        };

        let token_alias = env.optional("TOKEN_ALIAS", false);
        let access_key = Zeroizing::new(env.required("CRUSOE_ACCESS_KEY", true)?);
        let secret_key = Zeroizing::new(env.required("CRUSOE_SECRET_KEY", true)?);
        let registry_username = env.required("REGISTRY_USERNAME", false)?;
        let base_endpoint = env
            .with_default("CRUSOE_BASE_ENDPOINT", DEFAULT_BASE_ENDPOINT)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            namespaces,
            secret_name,
            registry_url,
            registry_username,
            token_lifetime_hours,
            token_alias,
            access_key,
            secret_key,
            base_endpoint,
        })
    }

    /// Expand the namespace list into per-namespace secret targets
    pub fn targets(&self) -> Vec<SecretTarget> {
        self.namespaces
            .iter()
            .map(|namespace| SecretTarget::new(namespace.clone(), self.secret_name.clone()))
            .collect()
    }
}

/// Split a comma-separated namespace list
///
/// Entries are trimmed, empty entries dropped, and duplicates removed keeping the first occurrence.
pub fn parse_namespaces(raw: &str) -> Vec<String> {
    let mut namespaces: Vec<String> = Vec::new();
    for namespace in raw.split(',').map(str::trim).filter(|ns| !ns.is_empty()) {
        if !namespaces.iter().any(|existing| existing == namespace) {
            namespaces.push(namespace.to_string());
        }
    }
    namespaces
}

fn parse_lifetime_hours(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "TOKEN_EXPIRATION_HOURS",
        value: raw.to_string(),
        reason,
    };
    let hours: u32 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if hours == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(hours)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &'static str, mask: bool) -> Option<String> {
        let value = (self.lookup)(key).filter(|v| !v.is_empty());
        match (&value, mask) {
            (Some(_), true) => debug!("Loaded env: {}=***masked***", key),
            (Some(v), false) => debug!("Loaded env: {}={}", key, v),
            (None, _) => debug!("Env not set: {}", key),
        }
        value
    }

    fn required(&self, key: &'static str, mask: bool) -> Result<String, ConfigError> {
        self.optional(key, mask).ok_or(ConfigError::Missing(key))
    }

    fn with_default(&self, key: &'static str, default: &str) -> String {
        self.optional(key, false)
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TARGET_NAMESPACE", "team-a, team-b"),
            ("REGISTRY_URL", "registry.crusoecloud.com"),
            ("CRUSOE_ACCESS_KEY", "access"),
            ("CRUSOE_SECRET_KEY", "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2s"),
            ("REGISTRY_USERNAME", "robot"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<RotationConfig, ConfigError> {
        RotationConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.namespaces, vec!["team-a", "team-b"]);
        assert_eq!(config.secret_name, DEFAULT_SECRET_NAME);
        assert_eq!(config.token_lifetime_hours, 12);
        assert_eq!(config.base_endpoint, "https://api.crusoecloud.com");
        assert!(config.token_alias.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut env = base_env();
        env.insert("TARGET_SECRET_NAME", "pull-secret");
        env.insert("TOKEN_EXPIRATION_HOURS", "48");
        env.insert("TOKEN_ALIAS", "nightly");
        env.insert("CRUSOE_BASE_ENDPOINT", "http://localhost:8080/");

        let config = load(&env).unwrap();
        assert_eq!(config.secret_name, "pull-secret");
        assert_eq!(config.token_lifetime_hours, 48);
        assert_eq!(config.token_alias.as_deref(), Some("nightly"));
        assert_eq!(config.base_endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_missing_required_variable() {
        let mut env = base_env();
        env.remove("CRUSOE_SECRET_KEY");
        match load(&env) {
            Err(ConfigError::Missing(name)) => assert_eq!(name, "CRUSOE_SECRET_KEY"),
            other => panic!("Expected missing CRUSOE_SECRET_KEY, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = base_env();
        env.insert("REGISTRY_USERNAME", "");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Missing("REGISTRY_USERNAME"))
        ));
    }

    #[test]
    fn test_blank_namespace_list() {
        let mut env = base_env();
        env.insert("TARGET_NAMESPACE", " , ,");
        assert!(matches!(load(&env), Err(ConfigError::NoNamespaces)));
    }

    #[test]
    fn test_invalid_lifetime() {
        for raw in ["twelve", "0", "-3"] {
            let mut env = base_env();
            env.insert("TOKEN_EXPIRATION_HOURS", raw);
            assert!(
                matches!(load(&env), Err(ConfigError::Invalid { name: "TOKEN_EXPIRATION_HOURS", .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_namespaces_dedupes_in_order() {
        assert_eq!(
            parse_namespaces("prod, dev,prod,, staging ,dev"),
            vec!["prod", "dev", "staging"]
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("a2tra2tr"));
        assert!(!rendered.contains("access_key"));
    }

    #[test]
    fn test_targets_share_secret_name() {
        let config = load(&base_env()).unwrap();
        let targets = config.targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].namespace, "team-a");
        assert_eq!(targets[1].namespace, "team-b");
        assert!(targets.iter().all(|t| t.secret_name == DEFAULT_SECRET_NAME));
    }
}
