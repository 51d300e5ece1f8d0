//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Static credential table used by the default authenticator.
    pub auth: AuthConfig,

    /// Route definitions.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds. Must be non-zero.
    pub connect_secs: u64,

    /// Upstream exchange timeout (request sent to response head) in seconds.
    /// Zero disables it.
    pub upstream_secs: u64,

    /// Inbound request timeout (total handler time) in seconds. Must be non-zero.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the in-memory response cache.
    pub enabled: bool,

    /// Maximum number of cached responses.
    pub max_entries: usize,

    /// Largest response body, in bytes, that is buffered for storage.
    /// Bigger bodies are streamed through and not cached.
    pub max_body_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Known bearer tokens and the claims they carry.
    pub tokens: HashMap<String, Value>,
}

/// How a route's path is compared with the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Prefix,
    Exact,
}

/// Route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier, also the leading component of its cache keys.
    pub id: String,

    /// Hosts to match. Empty or `*` matches any host.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Methods to match. Empty or `*` matches any method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Source path (prefix or exact, see `match_type`).
    pub path: String,

    #[serde(default)]
    pub match_type: MatchType,

    /// Replacement for the source path prefix when forwarding.
    #[serde(default)]
    pub rewrite: Option<String>,

    /// Upstream targets.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    /// Whether GET responses on this route may be cached.
    #[serde(default)]
    pub cacheable: bool,

    /// Ordered cache-key component expressions.
    #[serde(default)]
    pub cache_key: Vec<String>,

    /// Reject requests without a bearer token.
    #[serde(default)]
    pub auth_required: bool,

    /// Header templates applied to the outbound request.
    #[serde(default)]
    pub request_headers: Vec<HeaderConfig>,

    /// Header templates applied to the upstream response.
    #[serde(default)]
    pub response_headers: Vec<HeaderConfig>,
}

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    pub host: String,

    pub port: u16,

    /// "http" when empty.
    #[serde(default)]
    pub scheme: String,

    /// Relative weight for random selection (default: 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

/// Header operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOp {
    #[default]
    Set,
    Add,
    Del,
}

/// Header template: `value` is an expression or a literal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderConfig {
    pub key: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub op: HeaderOp,
}
