//! Response caching subsystem.
//!
//! # Data Flow
//! ```text
//! Cacheable route + GET request
//!     → key.rs (route id + evaluated cache-key expressions)
//!     → store.rs (CacheStore::get)
//!         hit  → replay stored headers + body, status 200
//!         miss → forward upstream
//!     → policy.rs (Cache-Control → TTL)
//!     → store.rs (CacheStore::set, last write wins)
//! ```
//!
//! # Design Decisions
//! - Only `no-cache`, `max-age` and `s-maxage` are recognised
//! - Directive order matters: the first decisive directive wins
//! - The store owns expiry; this subsystem only supplies the TTL
//! - No single-flight: concurrent misses may all store

pub mod key;
pub mod policy;
pub mod store;

pub use key::{CacheKey, CacheKeyError};
pub use policy::{cache_ttl, TtlParseError};
pub use store::{CacheEntry, CacheError, CacheStore, MemoryCacheStore};
