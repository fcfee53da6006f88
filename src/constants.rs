//! # Constants
//!
//! Default values and fixed protocol literals used across the rotator.

/// Default name of the image-pull secret written to each namespace
pub const DEFAULT_SECRET_NAME: &str = "crusoe-image-pull-secrets";

/// Default token lifetime (hours)
pub const DEFAULT_TOKEN_EXPIRATION_HOURS: u32 = 12;

/// Default Crusoe Cloud API endpoint
pub const DEFAULT_BASE_ENDPOINT: &str = "https://api.crusoecloud.com";

/// Timeout for the token issuance request (seconds)
pub const TOKEN_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "registry_token_rotator=info";

/// Kubernetes secret type for registry credentials
pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";

/// Data key holding the Docker config JSON inside the secret
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";
