//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → gateway.rs (route → auth → rewrite → cache → upstream → emit)
//!         → request.rs (bind request to a target)
//!         → headers.rs (header templates)
//!         → response.rs (post-processing, streaming)
//!     → Send to client
//! ```

pub mod gateway;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use gateway::Gateway;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{HeaderResponseMutator, ResponseMutationError, ResponseMutator};
pub use server::HttpServer;
