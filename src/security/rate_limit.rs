//! Fixed-window rate limiting for API routes.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Counter state after recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one.
    pub count: u32,
    /// When the current window ends.
    pub reset_at: Instant,
}

/// Storage backend for per-client counters.
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key`, opening a new window when none is active.
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit;

    /// Drop windows that ended before `now`; returns how many were dropped.
    fn purge_expired(&self, now: Instant) -> usize;
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Single-process store over a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: DashMap<String, Window>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl RateLimitStore for MemoryStore {
    fn hit(&self, key: &str, window: Duration, now: Instant) -> WindowHit {
        let mut entry = self
            .windows
            .entry(key.to_owned())
            .or_insert_with(|| Window {
                count: 0,
                reset_at: now + window,
            });

        if now >= entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + window;
        }
        entry.count = entry.count.saturating_add(1);

        WindowHit {
            count: entry.count,
            reset_at: entry.reset_at,
        }
    }

    fn purge_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| window.reset_at > now);
        before.saturating_sub(self.windows.len())
    }
}

/// Limits applied by the limiter.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    pub message: String,
}

impl From<&RateLimitConfig> for RateLimitPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: config.window(),
            message: config.message.clone(),
        }
    }
}

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { retry_after: Duration },
}

/// Counting service keyed by client identity.
pub struct RateLimiter {
    policy: RateLimitPolicy,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy, store: Arc<dyn RateLimitStore>) -> Self {
        Self { policy, store }
    }

    /// Limiter backed by a [`MemoryStore`].
    pub fn in_memory(policy: RateLimitPolicy) -> Self {
        Self::new(policy, Arc::new(MemoryStore::new()))
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Record a request from `key` and decide whether it may pass.
    pub fn check(&self, key: &str, now: Instant) -> Decision {
        let hit = self.store.hit(key, self.policy.window, now);
        let reset_after = hit.reset_at.saturating_duration_since(now);

        if hit.count > self.policy.max_requests {
            Decision::Limited {
                retry_after: reset_after,
            }
        } else {
            Decision::Allowed {
                remaining: self.policy.max_requests - hit.count,
                reset_after,
            }
        }
    }

    pub fn purge_expired(&self, now: Instant) -> usize {
        self.store.purge_expired(now)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// True for `/api` and anything below it.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: u64) {
    headers.insert(name, HeaderValue::from(value));
}

/// Middleware limiting API requests per client address.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_api_path(request.uri().path()) {
        return next.run(request).await;
    }

    let key = addr.ip().to_string();
    let limit = u64::from(limiter.policy().max_requests);

    match limiter.check(&key, Instant::now()) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            set_header(headers, "x-ratelimit-limit", limit);
            set_header(headers, "x-ratelimit-remaining", u64::from(remaining));
            set_header(headers, "x-ratelimit-reset", ceil_secs(reset_after));
            response
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            metrics::record_rate_limited();

            let mut response = Response::new(Body::from(limiter.policy().message.clone()));
            *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            set_header(headers, "x-ratelimit-limit", limit);
            set_header(headers, "x-ratelimit-remaining", 0);
            set_header(headers, "x-ratelimit-reset", ceil_secs(retry_after));
            headers.insert(header::RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after)));
            response
        }
    }
}

/// Periodically purge expired windows until shutdown.
pub async fn run_sweeper(
    limiter: Arc<RateLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = limiter.purge_expired(Instant::now());
                if purged > 0 {
                    tracing::debug!(purged, "Purged expired rate limit windows");
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max: u32, window: Duration) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: max,
            window,
            message: "slow down".into(),
        }
    }

    #[test]
    fn test_limits_after_max() {
        let limiter = RateLimiter::in_memory(policy(3, Duration::from_secs(60)));
        let now = Instant::now();

        for expected_remaining in [2, 1, 0] {
            match limiter.check("1.2.3.4", now) {
                Decision::Allowed { remaining, .. } => assert_eq!(remaining, expected_remaining),
                other => panic!("expected allowed, got {other:?}"),
            }
        }
        assert!(matches!(limiter.check("1.2.3.4", now), Decision::Limited { .. }));

        // Other clients have their own window.
        assert!(matches!(limiter.check("5.6.7.8", now), Decision::Allowed { .. }));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::in_memory(policy(1, Duration::from_secs(10)));
        let start = Instant::now();

        assert!(matches!(limiter.check("a", start), Decision::Allowed { .. }));
        assert!(matches!(
            limiter.check("a", start + Duration::from_secs(5)),
            Decision::Limited { retry_after } if retry_after == Duration::from_secs(5)
        ));
        assert!(matches!(
            limiter.check("a", start + Duration::from_secs(10)),
            Decision::Allowed { remaining: 0, .. }
        ));
    }

    #[test]
    fn test_purge_expired() {
        let store = MemoryStore::new();
        let start = Instant::now();
        store.hit("a", Duration::from_secs(1), start);
        store.hit("b", Duration::from_secs(100), start);

        assert_eq!(store.purge_expired(start + Duration::from_secs(2)), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_api_path() {
        assert!(is_api_path("/api"));
        assert!(is_api_path("/api/v1/tours"));
        assert!(!is_api_path("/apix"));
        assert!(!is_api_path("/"));
        assert!(!is_api_path("/tour/the-forest-hiker"));
    }

    #[test]
    fn test_ceil_secs() {
        assert_eq!(ceil_secs(Duration::from_millis(1500)), 2);
        assert_eq!(ceil_secs(Duration::from_secs(3)), 3);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }
}
