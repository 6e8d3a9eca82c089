//! Input pipeline.
//!
//! # Data Flow
//! ```text
//! Request (after static files, headers, logging, rate limit)
//!     → RequestContext::capture (query decode, bounded body read, cookie headers)
//!     → body_parser → cookie_parser → mongo_sanitize → xss_clean → hpp → request_time
//!     → RequestContext stored in request extensions
//!     → route dispatch
//! ```
//!
//! # Design Decisions
//! - Stages are an explicit ordered list, each `(context) -> context | error`
//! - A failing stage short-circuits; its error goes to the global error handler
//! - Stages are synchronous; all I/O happens during capture

pub mod body;
pub mod context;
pub mod query;
pub mod stages;

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::security::pollution::PollutionGuard;

pub use context::RequestContext;

/// One named transformation of the request context.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: RequestContext) -> Result<RequestContext, AppError>;
}

/// Ordered list of stages plus the body limit applied during capture.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    body_limit: usize,
}

impl Pipeline {
    /// Empty pipeline; stages are appended with [`Pipeline::stage`].
    pub fn new(body_limit: usize) -> Self {
        Self {
            stages: Vec::new(),
            body_limit,
        }
    }

    /// Append a stage. Order of calls is order of execution.
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// The standard input pipeline.
    pub fn from_config(config: &AppConfig) -> Self {
        let guard = PollutionGuard::new(config.sanitize.hpp_whitelist.iter().cloned());

        Self::new(config.body.limit_bytes)
            .stage(stages::BodyParser)
            .stage(stages::CookieParser)
            .stage(stages::OperatorSanitizer)
            .stage(stages::XssCleaner)
            .stage(stages::ParameterPollution::new(guard))
            .stage(stages::RequestTime)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Run every stage in order, stopping at the first error.
    pub fn run(&self, ctx: RequestContext) -> Result<RequestContext, AppError> {
        self.stages.iter().try_fold(ctx, |ctx, stage| {
            stage.apply(ctx).inspect_err(|err| {
                tracing::debug!(stage = stage.name(), error = %err, "Pipeline stage failed");
            })
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

/// Middleware running the pipeline and handing the context to the router.
pub async fn run_pipeline(
    State(pipeline): State<Arc<Pipeline>>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let ctx = match RequestContext::capture(&parts, body, pipeline.body_limit()).await {
        Ok(ctx) => ctx,
        Err(err) => return err.into_response(),
    };

    match pipeline.run(ctx) {
        Ok(ctx) => {
            parts.extensions.insert(ctx);
            next.run(Request::from_parts(parts, Body::empty())).await
        }
        Err(err) => err.into_response(),
    }
}
