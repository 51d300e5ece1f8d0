//! Gateway error taxonomy and its wire format.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthRejection;
use crate::cache::{CacheError, CacheKeyError};
use crate::http::response::ResponseMutationError;
use crate::load_balancer::TargetError;
use crate::routing::RoutingError;
use crate::upstream::TransportError;

/// Errors that stop the request pipeline.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    AuthRejected(#[from] AuthRejection),

    #[error(transparent)]
    CacheKey(#[from] CacheKeyError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("failed to prepare upstream request: {0}")]
    RequestMutation(String),

    #[error(transparent)]
    CacheBackend(#[from] CacheError),

    #[error(transparent)]
    Upstream(#[from] TransportError),

    #[error("failed to read upstream response: {0}")]
    UpstreamBody(String),

    #[error("response mutation failed: {0}")]
    ResponseMutation(#[from] ResponseMutationError),
}

impl GatewayError {
    /// Status reflecting the failing stage.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Routing(_) | GatewayError::CacheKey(_) => StatusCode::BAD_REQUEST,
            GatewayError::AuthRejected(rejection) => rejection.status,
            GatewayError::Target(_)
            | GatewayError::RequestMutation(_)
            | GatewayError::CacheBackend(_)
            | GatewayError::Upstream(_)
            | GatewayError::UpstreamBody(_)
            | GatewayError::ResponseMutation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
