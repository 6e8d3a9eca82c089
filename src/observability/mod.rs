//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → request_log.rs (request ids, development request lines)
//!
//! Consumers:
//!     → stdout (text in development, JSON in production)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request id flows from the outermost layer to the response
//! - Request logging is observational only and never alters a response

pub mod logging;
pub mod metrics;
pub mod request_log;
