//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → route.targets
//!     → weighted.rs (pick by ordinal, or weighted-random)
//!     → target.rs (host, port, scheme of the chosen upstream)
//!     → Request mutation binds the outbound URI to it
//! ```
//!
//! # Design Decisions
//! - Selection is a pure function over the route's immutable target list
//! - No shared counters: safe to call from any number of requests at once
//! - Weight 0 never wins unless every weight is 0 (uniform fallback)

pub mod target;
pub mod weighted;

pub use target::Target;
pub use weighted::{select_target, select_target_with};

use thiserror::Error;

/// Target selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("no targets configured for route")]
    NoTargetsConfigured,

    #[error("target index {index} out of range ({len} targets configured)")]
    OutOfRange { index: usize, len: usize },
}
