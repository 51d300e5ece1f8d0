//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! matched route + inbound request head
//!     → Authenticator::authenticate
//!     → Ok((token, claims))  → request context, header templates, cache keys
//!     → Err(rejection)       → error response with the rejection status
//! ```
//!
//! # Design Decisions
//! - Authorization policy lives behind the trait; the pipeline only
//!   consumes the token and claims
//! - The default authenticator reads a bearer token and looks its claims
//!   up in a static table

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, request::Parts, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::routing::Route;

/// Successful authentication output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    /// Raw credential, empty when none was presented.
    pub token: String,
    /// Claims carried by the credential, if known.
    pub claims: Option<Value>,
}

/// Authentication refusal with the status to answer with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthRejection {
    pub status: StatusCode,
    pub message: String,
}

impl AuthRejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, route: &Route, request: &Parts) -> Result<Identity, AuthRejection>;
}

/// Bearer token authenticator backed by a static claims table.
#[derive(Debug, Clone, Default)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, Value>,
}

impl TokenAuthenticator {
    pub fn new(tokens: HashMap<String, Value>) -> Self {
        Self { tokens }
    }
}

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(request: &Parts) -> Option<&str> {
    let value = request.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, route: &Route, request: &Parts) -> Result<Identity, AuthRejection> {
        let token = bearer_token(request).unwrap_or_default();
        let claims = self.tokens.get(token).cloned();

        if route.auth_required {
            if token.is_empty() {
                return Err(AuthRejection::new(StatusCode::UNAUTHORIZED, "missing bearer token"));
            }
            if claims.is_none() {
                return Err(AuthRejection::new(StatusCode::FORBIDDEN, "unknown bearer token"));
            }
        }

        Ok(Identity {
            token: token.to_string(),
            claims,
        })
    }
}
