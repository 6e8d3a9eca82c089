//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (group lookup, longest prefix first)
//!     → matcher.rs (segment-aware prefix test)
//!     → group router, or the not-found fallback
//!
//! Route assembly (at startup):
//!     RouteGroup routers
//!     → Sort prefixes longest first
//!     → Nest each group under its prefix, merge the root group
//!     → Freeze as one axum Router
//! ```
//!
//! # Design Decisions
//! - Routes assembled at startup, immutable at runtime
//! - No regex in the hot path (prefix matching only)
//! - Deterministic: same path always resolves to the same group

pub mod matcher;
pub mod router;

pub use router::{RouteGroup, RouteGroups, RouteTable};
