//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware chain)
//!     → static_files.rs (short-circuit for public assets)
//!     → [security, rate limit, input pipeline]
//!     → [route group dispatch] or error_handler.rs fallback
//!     → error_handler.rs (render any error as JSON or HTML)
//!     → Send to client
//! ```

pub mod error_handler;
pub mod extract;
pub mod server;
pub mod static_files;

pub use server::{AppState, HttpServer};
