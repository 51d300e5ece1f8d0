//! Compiled route definition.

use crate::config::{HeaderConfig, MatchType, RouteConfig};
use crate::load_balancer::{self, Target, TargetError};

/// A configured route. Read-only while requests are handled.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: String,
    /// Lowercased hosts; empty matches any.
    pub hosts: Vec<String>,
    /// Uppercased methods; empty matches any.
    pub methods: Vec<String>,
    /// Source path.
    pub path: String,
    pub match_type: MatchType,
    pub rewrite: Option<String>,
    pub targets: Vec<Target>,
    pub cacheable: bool,
    /// Cache-key component expressions, in key order.
    pub cache_key: Vec<String>,
    pub auth_required: bool,
    pub request_headers: Vec<HeaderConfig>,
    pub response_headers: Vec<HeaderConfig>,
}

impl Route {
    /// A route forwarding every path under `path` to `targets`.
    pub fn new(id: impl Into<String>, path: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            id: id.into(),
            hosts: Vec::new(),
            methods: Vec::new(),
            path: path.into(),
            match_type: MatchType::Prefix,
            rewrite: None,
            targets,
            cacheable: false,
            cache_key: Vec::new(),
            auth_required: false,
            request_headers: Vec::new(),
            response_headers: Vec::new(),
        }
    }

    /// Pick an upstream target. See [`load_balancer::select_target`].
    pub fn select_target(&self, weight_index: isize) -> Result<&Target, TargetError> {
        load_balancer::select_target(&self.targets, weight_index)
    }
}

impl From<RouteConfig> for Route {
    fn from(config: RouteConfig) -> Self {
        Self {
            id: config.id,
            hosts: config.hosts.iter().map(|h| h.to_lowercase()).collect(),
            methods: config.methods.iter().map(|m| m.to_uppercase()).collect(),
            path: config.path,
            match_type: config.match_type,
            rewrite: config.rewrite,
            targets: config.targets.into_iter().map(Target::from).collect(),
            cacheable: config.cacheable,
            cache_key: config.cache_key,
            auth_required: config.auth_required,
            request_headers: config.request_headers,
            response_headers: config.response_headers,
        }
    }
}
