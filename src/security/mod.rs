//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (protective header set)
//!
//! Incoming API request:
//!     → rate_limit.rs (per-IP fixed window)
//!
//! Decoded input (run as pipeline stages):
//!     → sanitize.rs (operator keys, markup)
//!     → pollution.rs (repeated parameters)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected request never reaches a route group
//! - No trust in client input

pub mod headers;
pub mod pollution;
pub mod rate_limit;
pub mod sanitize;

pub use headers::RouterSecurityExt;
pub use rate_limit::{MemoryStore, RateLimitPolicy, RateLimitStore, RateLimiter};
