//! The stages of the input pipeline.

use axum_extra::extract::cookie::CookieJar;
use chrono::{SecondsFormat, Utc};

use crate::error::AppError;
use crate::pipeline::body;
use crate::pipeline::context::RequestContext;
use crate::pipeline::Stage;
use crate::security::pollution::PollutionGuard;
use crate::security::sanitize;

/// Decodes the captured JSON or URL-encoded body.
#[derive(Debug, Default)]
pub struct BodyParser;

impl Stage for BodyParser {
    fn name(&self) -> &'static str {
        "body_parser"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        if let Some(raw) = ctx.raw_body.take() {
            ctx.body = body::decode(&raw)?;
            ctx.body_kind = Some(raw.kind);
        }
        Ok(ctx)
    }
}

/// Materializes the `Cookie` headers.
#[derive(Debug, Default)]
pub struct CookieParser;

impl Stage for CookieParser {
    fn name(&self) -> &'static str {
        "cookie_parser"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        let jar = CookieJar::from_headers(&ctx.cookie_headers);
        ctx.cookies = jar
            .iter()
            .map(|cookie| (cookie.name().to_owned(), cookie.value().to_owned()))
            .collect();
        Ok(ctx)
    }
}

/// Strips operator-like keys from query and body.
#[derive(Debug, Default)]
pub struct OperatorSanitizer;

impl Stage for OperatorSanitizer {
    fn name(&self) -> &'static str {
        "mongo_sanitize"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        let removed = sanitize::strip_operator_keys_in_map(&mut ctx.query)
            + sanitize::strip_operator_keys(&mut ctx.body);
        if removed > 0 {
            tracing::warn!(removed, "Stripped operator keys from request input");
        }
        Ok(ctx)
    }
}

/// Escapes markup in query and body strings.
#[derive(Debug, Default)]
pub struct XssCleaner;

impl Stage for XssCleaner {
    fn name(&self) -> &'static str {
        "xss_clean"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        sanitize::clean_xss_map(&mut ctx.query);
        sanitize::clean_xss_value(&mut ctx.body);
        Ok(ctx)
    }
}

/// Collapses polluted parameters.
///
/// Applies to the query, and to URL-encoded bodies when they decoded to an object.
#[derive(Debug)]
pub struct ParameterPollution {
    guard: PollutionGuard,
}

impl ParameterPollution {
    pub fn new(guard: PollutionGuard) -> Self {
        Self { guard }
    }
}

impl Stage for ParameterPollution {
    fn name(&self) -> &'static str {
        "hpp"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        ctx.query_polluted = self.guard.collapse(&mut ctx.query);
        if ctx.body_was_urlencoded() {
            if let Some(body) = ctx.body.as_object_mut() {
                self.guard.collapse(body);
            }
        }
        Ok(ctx)
    }
}

/// Stamps the request with the current time.
#[derive(Debug, Default)]
pub struct RequestTime;

impl Stage for RequestTime {
    fn name(&self) -> &'static str {
        "request_time"
    }

    fn apply(&self, mut ctx: RequestContext) -> Result<RequestContext, AppError> {
        ctx.request_time = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        Ok(ctx)
    }
}
