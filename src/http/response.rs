//! Response handling and transformation.
//!
//! # Responsibilities
//! - Post-process the upstream response (route response headers)
//! - Stream the upstream body to the client, logging copy failures
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Post-processing runs before the cache decision, so cached entries
//!   replay the post-processed headers

use async_trait::async_trait;
use axum::body::Body;
use axum::http::response::Parts;
use futures_util::TryStreamExt;
use thiserror::Error;

use crate::context::RequestContext;
use crate::http::headers::{apply_headers, resolve_headers};
use crate::routing::Route;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ResponseMutationError(pub String);

/// Post-processes upstream responses before they reach the client.
#[async_trait]
pub trait ResponseMutator: Send + Sync {
    async fn mutate(
        &self,
        route: &Route,
        response: &mut Parts,
        context: &RequestContext,
    ) -> Result<(), ResponseMutationError>;
}

/// Applies the route's response header templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderResponseMutator;

#[async_trait]
impl ResponseMutator for HeaderResponseMutator {
    async fn mutate(
        &self,
        route: &Route,
        response: &mut Parts,
        context: &RequestContext,
    ) -> Result<(), ResponseMutationError> {
        if !route.response_headers.is_empty() {
            let headers = resolve_headers(&route.response_headers, context);
            apply_headers(&headers, &mut response.headers);
        }
        Ok(())
    }
}

/// Wrap an upstream body so that read failures while streaming are logged.
///
/// The status line is already sent by then, so nothing else can be done.
pub fn stream_logged(body: Body, request_id: &str) -> Body {
    let request_id = request_id.to_string();
    Body::from_stream(body.into_data_stream().inspect_err(move |e| {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            "Failed to copy upstream response to downstream"
        );
    }))
}
