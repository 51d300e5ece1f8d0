//! Request context subsystem.
//!
//! # Data Flow
//! ```text
//! authenticator → (token, claims)
//! original request URL
//!     → RequestContext { args: { auth, token, url } }
//!     → expression.rs evaluates configured expressions against it
//!     → cache key components / header values
//! ```
//!
//! # Design Decisions
//! - The context is a `serde_json::Value` tree (string, number, bool,
//!   null, object, array), built fresh per request and never shared
//! - Evaluation returns an explicit error; callers decide on fallback

pub mod expression;

pub use expression::{Expression, ExpressionError};

use serde_json::{json, Value};

/// Per-request values exposed to configured expressions under `args`.
#[derive(Debug, Clone)]
pub struct RequestContext {
    state: Value,
}

impl RequestContext {
    /// Build the context from the authentication outputs and the original URL.
    pub fn new(claims: Option<Value>, token: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            state: json!({
                "args": {
                    "auth": claims.unwrap_or(Value::Null),
                    "token": token.into(),
                    "url": url.into(),
                }
            }),
        }
    }

    /// Evaluate raw expression text against this context.
    pub fn evaluate(&self, raw: &str) -> Result<Value, ExpressionError> {
        Expression::parse(raw)?.evaluate(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_shape() {
        let ctx = RequestContext::new(Some(json!({"id": 7})), "tok", "/a?b=1");
        assert_eq!(ctx.evaluate("args.auth.id").unwrap(), json!(7));
        assert_eq!(ctx.evaluate("args.token").unwrap(), json!("tok"));
        assert_eq!(ctx.evaluate("args.url").unwrap(), json!("/a?b=1"));
    }

    #[test]
    fn test_absent_claims_are_null() {
        let ctx = RequestContext::new(None, "", "/");
        assert_eq!(ctx.evaluate("args.auth").unwrap(), Value::Null);
        assert!(matches!(
            ctx.evaluate("args.auth.id"),
            Err(ExpressionError::TypeMismatch { found: "null", .. })
        ));
    }
}
