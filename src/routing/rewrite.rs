//! Path rewriting.

use crate::routing::Route;

/// Replace the route's source prefix with its rewrite prefix.
///
/// Without a rewrite, or when the path does not start with the source
/// prefix, the path is returned unchanged.
pub fn rewrite_path(path: &str, route: &Route) -> String {
    match (&route.rewrite, path.strip_prefix(route.path.as_str())) {
        (Some(rewrite), Some(rest)) => format!("{}{}", rewrite, rest),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(rewrite: Option<&str>) -> Route {
        let mut route = Route::new("r", "/api", vec![]);
        route.rewrite = rewrite.map(str::to_string);
        route
    }

    #[test]
    fn test_rewrite_prefix() {
        let r = route(Some("/v1"));
        assert_eq!(rewrite_path("/api/orders", &r), "/v1/orders");
        assert_eq!(rewrite_path("/api", &r), "/v1");
    }

    #[test]
    fn test_no_rewrite_configured() {
        let r = route(None);
        assert_eq!(rewrite_path("/api/orders", &r), "/api/orders");
        assert_eq!(rewrite_path("/other", &r), "/other");
    }

    #[test]
    fn test_non_matching_prefix_is_not_trimmed() {
        let r = route(Some("/v1"));
        for path in ["/images/a.png", "/ap", "/", "", "/API/orders"] {
            assert_eq!(rewrite_path(path, &r), path);
        }
    }
}
