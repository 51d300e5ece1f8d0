//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! mutated request (absolute URI bound to the selected target)
//!     → transport.rs (Transport::send)
//!     → upstream response head; body streamed on demand
//! ```
//!
//! # Design Decisions
//! - The client is constructed once and injected; tests substitute a stub
//! - Redirects are returned to the caller, never followed
//! - Connect and exchange timeouts map to transport errors

pub mod transport;

pub use transport::{HyperTransport, Transport, TransportError};
