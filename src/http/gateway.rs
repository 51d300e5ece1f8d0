//! Per-request proxy pipeline.
//!
//! # Stages
//! ```text
//! RouteSelection → RequestMutation → CacheLookup ─┬─ hit ──────────────→ emit cached (200)
//!                                                 └─ miss/skip → Upstream
//!     → ResponseMutation → CacheStoreDecision → ResponseEmission
//! ```
//!
//! Stages run strictly in order and the first failing stage answers with
//! `{"error": ...}`. Cache lookup and store only happen for cacheable
//! routes on GET. Request and response bodies are owned values, so every
//! exit path releases them exactly once; a dropped handler future (client
//! gone, inbound timeout) abandons the pipeline before any later stage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{
    header::{CACHE_CONTROL, CONTENT_LENGTH},
    response, Method, Request, Response,
};
use axum::response::IntoResponse;
use bytes::BytesMut;
use futures_util::{stream, StreamExt};

use crate::auth::{Authenticator, TokenAuthenticator};
use crate::cache::{cache_ttl, CacheEntry, CacheKey, CacheStore, MemoryCacheStore};
use crate::config::{CacheConfig, GatewayConfig};
use crate::context::RequestContext;
use crate::error::GatewayError;
use crate::http::headers::{apply_headers, resolve_headers};
use crate::http::request::{prepare_request, request_host, request_id};
use crate::http::response::{stream_logged, HeaderResponseMutator, ResponseMutator};
use crate::observability::metrics;
use crate::routing::{rewrite_path, Route, RouteMatcher, RouteTable};
use crate::upstream::{HyperTransport, Transport};

/// The request-routing and response-caching core.
///
/// Every collaborator is injected and shared by all requests.
#[derive(Clone)]
pub struct Gateway {
    routes: Arc<dyn RouteMatcher>,
    authenticator: Arc<dyn Authenticator>,
    response_mutator: Arc<dyn ResponseMutator>,
    cache: Option<Arc<dyn CacheStore>>,
    cache_body_limit: usize,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    /// A gateway without a cache, with the default authenticator and
    /// response post-processor.
    pub fn new(routes: Arc<dyn RouteMatcher>, transport: Arc<dyn Transport>) -> Self {
        Self {
            routes,
            authenticator: Arc::new(TokenAuthenticator::default()),
            response_mutator: Arc::new(HeaderResponseMutator),
            cache: None,
            cache_body_limit: CacheConfig::default().max_body_size,
            transport,
        }
    }

    /// Build the production gateway described by a configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let routes: Vec<Route> = config.routes.iter().cloned().map(Route::from).collect();
        let gateway = Self::new(
            Arc::new(RouteTable::new(routes)),
            Arc::new(HyperTransport::new(&config.timeouts)),
        )
        .with_authenticator(Arc::new(TokenAuthenticator::new(config.auth.tokens.clone())));

        if config.cache.enabled {
            gateway
                .with_cache(Arc::new(MemoryCacheStore::new(config.cache.max_entries)))
                .with_cache_body_limit(config.cache.max_body_size)
        } else {
            gateway
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Responses with bigger bodies are streamed through without storing.
    pub fn with_cache_body_limit(mut self, limit: usize) -> Self {
        self.cache_body_limit = limit;
        self
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn with_response_mutator(mut self, response_mutator: Arc<dyn ResponseMutator>) -> Self {
        self.response_mutator = response_mutator;
        self
    }

    /// Run the full pipeline for one request.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let start_time = Instant::now();
        let request_id = request_id(request.headers()).to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let host = request_host(request.headers(), request.uri());

        // 1. Match Route
        let route = match self.routes.match_route(&host, &method, &path) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(request_id = %request_id, host = %host, path = %path, "No route matched");
                let response = GatewayError::from(e).into_response();
                metrics::record_request(method.as_str(), response.status().as_u16(), "none", start_time);
                return response;
            }
        };

        tracing::debug!(
            request_id = %request_id,
            route = %route.id,
            method = %method,
            path = %path,
            "Selected route"
        );

        let response = match self.forward(&route, request, &request_id).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    tracing::error!(request_id = %request_id, route = %route.id, error = %e, "Request failed");
                } else {
                    tracing::warn!(request_id = %request_id, route = %route.id, error = %e, "Request rejected");
                }
                e.into_response()
            }
        };

        metrics::record_request(method.as_str(), response.status().as_u16(), &route.id, start_time);
        response
    }

    async fn forward(
        &self,
        route: &Route,
        request: Request<Body>,
        request_id: &str,
    ) -> Result<Response<Body>, GatewayError> {
        let (mut parts, body) = request.into_parts();

        // 2. Authenticate and mutate the request
        let identity = self.authenticator.authenticate(route, &parts).await?;
        let context = RequestContext::new(identity.claims, identity.token, parts.uri.to_string());

        let path = rewrite_path(parts.uri.path(), route);
        if !route.request_headers.is_empty() {
            apply_headers(&resolve_headers(&route.request_headers, &context), &mut parts.headers);
        }
        let target = prepare_request(&mut parts, route, &path)?;
        tracing::debug!(
            request_id = %request_id,
            target = %target.authority(),
            upstream_path = %path,
            "Bound request to target"
        );

        // 3. Cache lookup (fast path)
        let pending_store = match &self.cache {
            Some(cache) if route.cacheable && parts.method == Method::GET => {
                let key = CacheKey::build(route, &context)?;
                if let Some(entry) = cache.get(&key).await? {
                    tracing::debug!(request_id = %request_id, cache_key = %key, "Cache hit");
                    metrics::record_cache_lookup(&route.id, true);
                    return Ok(entry.into_response());
                }
                metrics::record_cache_lookup(&route.id, false);
                Some((cache.as_ref(), key))
            }
            _ => None,
        };

        // 4. Forward upstream
        let response = self
            .transport
            .send(Request::from_parts(parts, body))
            .await
            .inspect_err(|_| metrics::record_upstream_error(&route.id))?;
        let (mut head, upstream_body) = response.into_parts();

        // 5. Post-process the response
        self.response_mutator.mutate(route, &mut head, &context).await?;

        // 6. Cache store decision
        let cache_control = head
            .headers
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match (pending_store, cache_control) {
            (Some((cache, key)), Some(cache_control)) => {
                let store = PendingStore {
                    cache,
                    route,
                    key: &key,
                    body_limit: self.cache_body_limit,
                    request_id,
                };
                store.run(&head, upstream_body, &cache_control).await?
            }
            _ => upstream_body,
        };

        // 7. Emit
        Ok(Response::from_parts(head, stream_logged(body, request_id)))
    }
}

/// A cache write decided during cache lookup, completed once the upstream
/// response head is known.
struct PendingStore<'a> {
    cache: &'a dyn CacheStore,
    route: &'a Route,
    key: &'a CacheKey,
    body_limit: usize,
    request_id: &'a str,
}

impl PendingStore<'_> {
    /// Store the response when its Cache-Control allows it.
    ///
    /// The status code is not consulted: any response with a usable TTL
    /// is stored, and hits always replay as 200 with the stored headers.
    ///
    /// Returns the body to send to the client: the original stream when
    /// nothing is stored, otherwise a fresh body over the buffered bytes.
    async fn run(self, head: &response::Parts, body: Body, cache_control: &str) -> Result<Body, GatewayError> {
        let ttl = match cache_ttl(cache_control) {
            Ok(Some(ttl)) => ttl,
            Ok(None) => {
                metrics::record_cache_store(&self.route.id, "skipped");
                return Ok(body);
            }
            Err(e) => {
                tracing::warn!(request_id = %self.request_id, error = %e, "Not caching response");
                metrics::record_cache_store(&self.route.id, "skipped");
                return Ok(body);
            }
        };

        let declared = head
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > self.body_limit) {
            self.skip_oversized();
            return Ok(body);
        }

        let mut chunks = body.into_data_stream();
        let mut buffered = BytesMut::new();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| GatewayError::UpstreamBody(e.to_string()))?;
            buffered.extend_from_slice(&chunk);
            if buffered.len() > self.body_limit {
                self.skip_oversized();
                // Replay what was read, then the rest of the upstream stream
                let replay = stream::iter([Ok(buffered.freeze())]);
                return Ok(Body::from_stream(replay.chain(chunks)));
            }
        }
        let bytes = buffered.freeze();

        let entry = CacheEntry {
            headers: head.headers.clone(),
            body: bytes.clone(),
        };
        match self.cache.set(self.key, Duration::from_secs(ttl), entry).await {
            Ok(()) => {
                tracing::debug!(
                    request_id = %self.request_id,
                    cache_key = %self.key,
                    ttl_secs = ttl,
                    "Stored response"
                );
                metrics::record_cache_store(&self.route.id, "stored");
            }
            Err(e) => {
                tracing::error!(
                    request_id = %self.request_id,
                    cache_key = %self.key,
                    error = %e,
                    "Failed to store response"
                );
                metrics::record_cache_store(&self.route.id, "failed");
            }
        }

        Ok(Body::from(bytes))
    }

    fn skip_oversized(&self) {
        tracing::debug!(
            request_id = %self.request_id,
            cache_key = %self.key,
            limit = self.body_limit,
            "Response body too large to cache"
        );
        metrics::record_cache_store(&self.route.id, "skipped");
    }
}
