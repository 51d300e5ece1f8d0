//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract routing-relevant information (host, path)
//! - Prepare request for forwarding to the selected target
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The inbound request is reused as the outbound one: its URI is
//!   rebuilt in absolute form and its version reset for the client

use axum::http::{
    header::HOST, request::Parts, HeaderMap, HeaderValue, Request, Uri, Version,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::load_balancer::Target;
use crate::routing::Route;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Host the request was addressed to, lowercased and without port.
pub fn request_host(headers: &HeaderMap, uri: &Uri) -> String {
    let raw = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.host())
        .unwrap_or_default();

    let host = if raw.starts_with('[') {
        // IPv6 literal: keep through the closing bracket
        raw.find(']').map_or(raw, |end| &raw[..=end])
    } else {
        raw.split(':').next().unwrap_or_default()
    };
    host.to_lowercase()
}

/// Bind the request to a target of the route and set its outbound path.
///
/// The query string of the inbound URI is kept. The `Host` header is the
/// target host; the URI authority is `host:port`.
pub fn prepare_request<'r>(
    parts: &mut Parts,
    route: &'r Route,
    path: &str,
) -> Result<&'r Target, GatewayError> {
    // Negative index: weighted-random choice
    let target = route.select_target(-1)?;

    let mut path_and_query = String::with_capacity(path.len() + 1);
    if !path.starts_with('/') {
        path_and_query.push('/');
    }
    path_and_query.push_str(path);
    if let Some(query) = parts.uri.query() {
        path_and_query.push('?');
        path_and_query.push_str(query);
    }

    let uri = Uri::builder()
        .scheme(target.scheme())
        .authority(target.authority())
        .path_and_query(path_and_query)
        .build()
        .map_err(|e| GatewayError::RequestMutation(e.to_string()))?;
    let host = HeaderValue::from_str(&target.host)
        .map_err(|e| GatewayError::RequestMutation(e.to_string()))?;

    parts.uri = uri;
    parts.version = Version::HTTP_11;
    parts.headers.insert(HOST, host);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::TargetError;

    fn parts(uri: &str, host: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri).version(Version::HTTP_2);
        if let Some(host) = host {
            builder = builder.header(HOST, host);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_prepare_request() {
        let route = Route::new("r", "/api", vec![Target::new("backend.internal", 3000, 1)]);
        let mut p = parts("/api/orders?page=2", Some("gateway.example.com:8080"));

        let target = prepare_request(&mut p, &route, "/v1/orders").unwrap();
        assert_eq!(target.host, "backend.internal");
        assert_eq!(p.uri.to_string(), "http://backend.internal:3000/v1/orders?page=2");
        assert_eq!(p.headers[HOST], "backend.internal");
        assert_eq!(p.version, Version::HTTP_11);
    }

    #[test]
    fn test_target_scheme() {
        let mut target = Target::new("secure.internal", 8443, 1);
        target.scheme = "https".into();
        let route = Route::new("r", "/", vec![target]);
        let mut p = parts("/x", None);

        prepare_request(&mut p, &route, "/x").unwrap();
        assert_eq!(p.uri.scheme_str(), Some("https"));
        assert_eq!(p.uri.authority().unwrap().as_str(), "secure.internal:8443");
    }

    #[test]
    fn test_no_targets() {
        let route = Route::new("r", "/", vec![]);
        let mut p = parts("/x", None);
        let err = prepare_request(&mut p, &route, "/x").unwrap_err();
        assert!(matches!(err, GatewayError::Target(TargetError::NoTargetsConfigured)));
        assert_eq!(p.uri, "/x");
    }

    #[test]
    fn test_request_host() {
        let host = |uri: &str, header: Option<&str>| {
            let p = parts(uri, header);
            request_host(&p.headers, &p.uri)
        };
        assert_eq!(host("/", Some("Example.COM:8080")), "example.com");
        assert_eq!(host("/", Some("[::1]:8080")), "[::1]");
        assert_eq!(host("http://h2.example.com/", None), "h2.example.com");
        assert_eq!(host("/", None), "");
    }
}
