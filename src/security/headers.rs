//! Security response headers.
//!
//! # Responsibilities
//! - Add the protective header set to every response passing this layer
//!
//! # Design Decisions
//! - Headers are only added when absent, so a handler can still override one
//! - Values are a fixed table; only HSTS age and CSP come from config

use axum::http::header::{self, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

/// The header set, in the order it is applied.
pub fn security_headers(config: &SecurityConfig) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = Vec::with_capacity(11);

    match HeaderValue::from_str(&config.content_security_policy) {
        Ok(csp) => headers.push((header::CONTENT_SECURITY_POLICY, csp)),
        Err(_) => tracing::warn!("Ignoring content security policy with invalid characters"),
    }

    headers.extend([
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            header::X_DNS_PREFETCH_CONTROL,
            HeaderValue::from_static("off"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            hsts_value(config.hsts_max_age_secs),
        ),
        (
            HeaderName::from_static("x-download-options"),
            HeaderValue::from_static("noopen"),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("0")),
    ]);

    headers
}

fn hsts_value(max_age_secs: u64) -> HeaderValue {
    // Digits and ASCII only, always a valid header value.
    HeaderValue::from_str(&format!("max-age={max_age_secs}; includeSubDomains"))
        .unwrap_or_else(|_| HeaderValue::from_static("max-age=15552000; includeSubDomains"))
}

/// Extension trait for `axum::`[`Router`] to apply the security header set.
pub trait RouterSecurityExt {
    fn with_security_headers(self, config: &SecurityConfig) -> Self;
}

impl<S> RouterSecurityExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security_headers(self, config: &SecurityConfig) -> Self {
        security_headers(config)
            .into_iter()
            .fold(self, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::if_not_present(name, value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_set() {
        let headers = security_headers(&SecurityConfig::default());
        let names: Vec<&str> = headers.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(headers.len(), 11);
        assert!(names.contains(&"content-security-policy"));
        assert!(names.contains(&"x-frame-options"));
        assert!(names.contains(&"x-content-type-options"));
    }

    #[test]
    fn test_hsts_age_from_config() {
        let config = SecurityConfig {
            hsts_max_age_secs: 60,
            ..SecurityConfig::default()
        };
        let headers = security_headers(&config);
        let hsts = headers
            .iter()
            .find(|(n, _)| *n == header::STRICT_TRANSPORT_SECURITY)
            .map(|(_, v)| v.to_str().unwrap().to_owned());

        assert_eq!(hsts.as_deref(), Some("max-age=60; includeSubDomains"));
    }

    #[test]
    fn test_invalid_csp_is_skipped() {
        let config = SecurityConfig {
            content_security_policy: "bad\nvalue".into(),
            ..SecurityConfig::default()
        };
        assert_eq!(security_headers(&config).len(), 10);
    }
}
