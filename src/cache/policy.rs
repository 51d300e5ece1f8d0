//! Cache-Control driven storage policy.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cache duration in directive `{directive}`")]
pub struct TtlParseError {
    pub directive: String,
}

/// Decide whether, and for how many seconds, a response may be stored.
///
/// Directives are scanned in header order. `no-cache` stops the scan with
/// no TTL. The first `max-age` or `s-maxage` directive supplies the TTL.
/// `Ok(None)` means the response must not be stored.
pub fn cache_ttl(cache_control: &str) -> Result<Option<u64>, TtlParseError> {
    for raw in cache_control.split(',') {
        let directive = raw.trim();
        if directive.eq_ignore_ascii_case("no-cache") {
            return Ok(None);
        }
        if directive.starts_with("max-age") || directive.starts_with("s-maxage") {
            return directive
                .split_once('=')
                .and_then(|(_, value)| value.trim().parse::<u64>().ok())
                .map(Some)
                .ok_or_else(|| TtlParseError {
                    directive: directive.to_string(),
                });
        }
    }
    Ok(None)
}
