//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, cache capacity)
//! - Check that configured expressions and header names are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, HeaderConfig, RouteConfig};
use crate::context::Expression;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{0} has an empty id")]
    EmptyRouteId(usize),

    #[error("route id `{0}` is used more than once")]
    DuplicateRouteId(String),

    #[error("route `{route}`: path `{path}` must start with '/'")]
    InvalidPath { route: String, path: String },

    #[error("route `{route}`: rewrite `{rewrite}` must start with '/'")]
    InvalidRewrite { route: String, rewrite: String },

    #[error("route `{0}` has no targets")]
    NoTargets(String),

    #[error("route `{route}`: target {reason}")]
    InvalidTarget { route: String, reason: String },

    #[error("route `{route}`: unsupported target scheme `{scheme}`")]
    UnsupportedScheme { route: String, scheme: String },

    #[error("route `{route}`: invalid cache key expression `{expression}`")]
    InvalidCacheExpression { route: String, expression: String },

    #[error("route `{route}`: invalid header name `{key}`")]
    InvalidHeaderName { route: String, key: String },

    #[error("cache.max_entries must be greater than zero")]
    ZeroCacheCapacity,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cache.enabled && config.cache.max_entries == 0 {
        errors.push(ValidationError::ZeroCacheCapacity);
    }
    // Only upstream_secs treats zero as "no limit"
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.id.is_empty() {
            errors.push(ValidationError::EmptyRouteId(index));
        } else if !seen.insert(route.id.as_str()) {
            errors.push(ValidationError::DuplicateRouteId(route.id.clone()));
        }
        validate_route(route, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    let id = &route.id;

    if !route.path.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            route: id.clone(),
            path: route.path.clone(),
        });
    }
    if let Some(rewrite) = &route.rewrite {
        if !rewrite.starts_with('/') {
            errors.push(ValidationError::InvalidRewrite {
                route: id.clone(),
                rewrite: rewrite.clone(),
            });
        }
    }

    if route.targets.is_empty() {
        errors.push(ValidationError::NoTargets(id.clone()));
    }
    for target in &route.targets {
        if target.host.is_empty() {
            errors.push(ValidationError::InvalidTarget {
                route: id.clone(),
                reason: "host is empty".to_string(),
            });
        }
        if target.port == 0 {
            errors.push(ValidationError::InvalidTarget {
                route: id.clone(),
                reason: format!("{} has port 0", target.host),
            });
        }
        if !matches!(target.scheme.as_str(), "" | "http" | "https") {
            errors.push(ValidationError::UnsupportedScheme {
                route: id.clone(),
                scheme: target.scheme.clone(),
            });
        }
    }

    for expression in &route.cache_key {
        if Expression::parse(expression).is_err() {
            errors.push(ValidationError::InvalidCacheExpression {
                route: id.clone(),
                expression: expression.clone(),
            });
        }
    }

    let headers: Vec<&HeaderConfig> = route
        .request_headers
        .iter()
        .chain(route.response_headers.iter())
        .collect();
    for header in headers {
        if HeaderName::from_bytes(header.key.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName {
                route: id.clone(),
                key: header.key.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TargetConfig;

    fn route(id: &str) -> RouteConfig {
        RouteConfig {
            id: id.to_string(),
            hosts: vec![],
            methods: vec![],
            path: "/".to_string(),
            match_type: Default::default(),
            rewrite: None,
            targets: vec![TargetConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                scheme: String::new(),
                weight: 1,
            }],
            cacheable: false,
            cache_key: vec![],
            auth_required: false,
            request_headers: vec![],
            response_headers: vec![],
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = GatewayConfig::default();
        config.routes.push(route("a"));
        config.routes.push(route("b"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_ids() {
        let mut config = GatewayConfig::default();
        config.routes.push(route("a"));
        config.routes.push(route("a"));
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::DuplicateRouteId("a".into())]
        );
    }

    #[test]
    fn test_route_checks() {
        let mut bad = route("a");
        bad.rewrite = Some("v1".into());
        bad.targets[0].scheme = "ftp".into();
        bad.targets[0].port = 0;
        bad.cache_key = vec!["args..url".into()];
        bad.request_headers.push(HeaderConfig {
            key: "bad header".into(),
            value: "x".into(),
            op: Default::default(),
        });

        let mut config = GatewayConfig::default();
        config.routes.push(bad);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::UnsupportedScheme {
            route: "a".into(),
            scheme: "ftp".into()
        }));
    }

    #[test]
    fn test_zero_capacity() {
        let mut config = GatewayConfig::default();
        config.cache.max_entries = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::ZeroCacheCapacity]
        );
        config.cache.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeouts() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 0;
        config.timeouts.connect_secs = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![
                ValidationError::ZeroTimeout("connect_secs"),
                ValidationError::ZeroTimeout("request_secs"),
            ]
        );

        config.timeouts.request_secs = 60;
        config.timeouts.connect_secs = 5;
        config.timeouts.upstream_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}
