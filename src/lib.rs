//! HTTP ingress gateway: route matching, request mutation, response
//! caching and load-balanced forwarding.

pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::{Gateway, HttpServer};
pub use lifecycle::Shutdown;
