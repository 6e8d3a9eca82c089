//! Natours booking application library

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod pipeline;
pub mod routing;

// Application
pub mod client;
pub mod resources;
pub mod templates;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::AppConfig;
pub use error::{AppError, AppResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
