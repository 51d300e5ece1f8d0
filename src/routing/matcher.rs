//! Route matching logic.
//!
//! # Responsibilities
//! - Match host (case-insensitive, any of a list)
//! - Match method (any of a list)
//! - Match path (prefix or exact, case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive
//! - Empty condition or `*` = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::config::MatchType;
use crate::routing::Route;

/// Routing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("no route matches {method} {host}{path}")]
    NoMatchingRoute {
        host: String,
        method: String,
        path: String,
    },
}

/// Resolves a request to its configured route.
pub trait RouteMatcher: Send + Sync {
    fn match_route(&self, host: &str, method: &Method, path: &str) -> Result<Arc<Route>, RoutingError>;
}

/// The routing-relevant parts of a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestTarget<'a> {
    pub host: &'a str,
    pub method: &'a Method,
    pub path: &'a str,
}

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &RequestTarget<'_>) -> bool;
}

/// Matches the host against a list of accepted hosts.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    hosts: Vec<String>,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// Hosts are normalized to lowercase for case-insensitive matching.
    pub fn new(hosts: &[String]) -> Self {
        Self {
            hosts: hosts.iter().map(|h| h.to_lowercase()).collect(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> bool {
        self.hosts
            .iter()
            .any(|h| h == "*" || h.eq_ignore_ascii_case(req.host))
    }
}

/// Matches the request method against a list of accepted methods.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<String>,
}

impl MethodMatcher {
    pub fn new(methods: &[String]) -> Self {
        Self {
            methods: methods.iter().map(|m| m.to_uppercase()).collect(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> bool {
        self.methods
            .iter()
            .any(|m| m == "*" || m == req.method.as_str())
    }
}

/// Matches the request path by prefix or exactly.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    path: String,
    match_type: MatchType,
}

impl PathMatcher {
    pub fn new(path: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            path: path.into(),
            match_type,
        }
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> bool {
        match self.match_type {
            MatchType::Prefix => req.path.starts_with(&self.path),
            MatchType::Exact => req.path == self.path,
        }
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Compile the conditions of a route. Empty lists add no condition.
    pub fn for_route(route: &Route) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        if !route.hosts.is_empty() {
            matchers.push(Box::new(HostMatcher::new(&route.hosts)));
        }
        if !route.methods.is_empty() {
            matchers.push(Box::new(MethodMatcher::new(&route.methods)));
        }
        matchers.push(Box::new(PathMatcher::new(route.path.clone(), route.match_type)));
        Self::new(matchers)
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &RequestTarget<'_>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}

/// Immutable table of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<(Arc<Route>, AndMatcher)>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        let routes = routes
            .into_iter()
            .map(|route| {
                let matcher = AndMatcher::for_route(&route);
                (Arc::new(route), matcher)
            })
            .collect();
        Self { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteMatcher for RouteTable {
    fn match_route(&self, host: &str, method: &Method, path: &str) -> Result<Arc<Route>, RoutingError> {
        let req = RequestTarget { host, method, path };

        let mut best: Option<&Arc<Route>> = None;
        for (route, matcher) in &self.routes {
            if !matcher.matches(&req) {
                continue;
            }
            // Strictly longer wins, so earlier routes keep ties.
            if best.map_or(true, |b| route.path.len() > b.path.len()) {
                best = Some(route);
            }
        }

        best.cloned().ok_or_else(|| RoutingError::NoMatchingRoute {
            host: host.to_string(),
            method: method.to_string(),
            path: path.to_string(),
        })
    }
}
