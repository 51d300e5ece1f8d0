//! Upstream target abstraction.

use crate::config::TargetConfig;

/// A single upstream endpoint of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    /// Empty means plain HTTP.
    pub scheme: String,
    /// Relative weight for random selection.
    pub weight: u32,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16, weight: u32) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: String::new(),
            weight,
        }
    }

    /// The scheme to forward with, defaulting to `http`.
    pub fn scheme(&self) -> &str {
        if self.scheme.is_empty() {
            "http"
        } else {
            &self.scheme
        }
    }

    /// `host:port` destination authority.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<TargetConfig> for Target {
    fn from(config: TargetConfig) -> Self {
        Self {
            host: config.host,
            port: config.port,
            scheme: config.scheme,
            weight: config.weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_default() {
        let mut target = Target::new("svc.local", 8080, 1);
        assert_eq!(target.scheme(), "http");
        assert_eq!(target.authority(), "svc.local:8080");

        target.scheme = "https".into();
        assert_eq!(target.scheme(), "https");
    }
}
