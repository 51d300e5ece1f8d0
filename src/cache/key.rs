//! Cache key derivation.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::context::{ExpressionError, RequestContext};
use crate::routing::Route;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyError {
    #[error("invalid cache expression `{expression}`: {source}")]
    InvalidCacheExpression {
        expression: String,
        #[source]
        source: ExpressionError,
    },
}

/// Composite key: route id followed by the evaluated components.
///
/// Components are serialized as a JSON array, so two keys are equal exactly
/// when the route ids and every component value are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Evaluate the route's cache-key expressions in order.
    ///
    /// Fails on the first expression that cannot be evaluated.
    pub fn build(route: &Route, context: &RequestContext) -> Result<Self, CacheKeyError> {
        let mut components = Vec::with_capacity(route.cache_key.len());
        for expression in &route.cache_key {
            let value = context
                .evaluate(expression)
                .map_err(|source| CacheKeyError::InvalidCacheExpression {
                    expression: expression.clone(),
                    source,
                })?;
            components.push(value);
        }
        Ok(Self::from_parts(&route.id, components))
    }

    pub fn from_parts(route_id: &str, components: Vec<Value>) -> Self {
        Self(format!("{}::{}", route_id, Value::Array(components)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
