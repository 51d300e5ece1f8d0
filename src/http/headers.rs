//! Header templating.
//!
//! A configured header value is first tried as an expression against the
//! request context. Strings are used verbatim, other values as compact
//! JSON. When evaluation fails the configured text is used unchanged, so
//! plain literals such as `application/json` need no quoting.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::config::{HeaderConfig, HeaderOp};
use crate::context::RequestContext;

/// Resolve every header template, preserving order and count.
pub fn resolve_headers(headers: &[HeaderConfig], context: &RequestContext) -> Vec<HeaderConfig> {
    headers
        .iter()
        .map(|header| HeaderConfig {
            key: header.key.clone(),
            value: resolve_value(&header.value, context),
            op: header.op,
        })
        .collect()
}

fn resolve_value(raw: &str, context: &RequestContext) -> String {
    match context.evaluate(raw) {
        Ok(Value::String(text)) => text,
        Ok(other) => other.to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Apply resolved headers to a header map.
///
/// Names or values that are not valid HTTP are skipped with a warning.
pub fn apply_headers(headers: &[HeaderConfig], target: &mut HeaderMap) {
    for header in headers {
        let name = match HeaderName::from_bytes(header.key.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                tracing::warn!(header = %header.key, "Skipping header with invalid name");
                continue;
            }
        };

        if header.op == HeaderOp::Del {
            target.remove(&name);
            continue;
        }

        let value = match HeaderValue::from_str(&header.value) {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(header = %header.key, "Skipping header with invalid value");
                continue;
            }
        };
        match header.op {
            HeaderOp::Set => {
                target.insert(name, value);
            }
            HeaderOp::Add => {
                target.append(name, value);
            }
            HeaderOp::Del => {}
        }
    }
}
