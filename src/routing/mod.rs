//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, method, path)
//!     → matcher.rs (RouteMatcher: evaluate match conditions)
//!     → Return: matched Route or NoMatchingRoute
//!     → rewrite.rs (source prefix → rewrite prefix)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → route.rs (Route with targets and cache/header policy)
//!     → compile matchers per route
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix/exact matching only)
//! - Deterministic: same input always matches same route
//! - Longest configured path wins; ties keep configuration order

pub mod matcher;
pub mod rewrite;
pub mod route;

pub use matcher::{RouteMatcher, RouteTable, RoutingError};
pub use rewrite::rewrite_path;
pub use route::Route;
