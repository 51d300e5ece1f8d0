//! Outbound HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::TimeoutConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("upstream request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a prepared request to its upstream.
///
/// Implementations must not follow redirects: a 3xx response is returned
/// as is.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;
}

/// Pooled hyper client. hyper never chases redirects.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    timeout: Option<Duration>,
}

impl HyperTransport {
    pub fn new(config: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        let timeout = (config.upstream_secs > 0).then(|| Duration::from_secs(config.upstream_secs));

        Self { client, timeout }
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let response_future = self.client.request(request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, response_future)
                .await
                .map_err(|_| TransportError::Timeout(limit))?,
            None => response_future.await,
        }
        .map_err(|e| TransportError::Request(Box::new(e)))?;

        Ok(response.map(Body::new))
    }
}
