//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the application state
//! - Assemble the route groups behind the not-found fallback
//! - Wire the middleware chain in its fixed order
//! - Serve over plain TCP or TLS with graceful shutdown
//!
//! # Middleware order (outermost first)
//! ```text
//! request id → metrics
//!     → static files
//!     → security headers
//!     → development request log
//!     → rate limit (/api only)
//!     → global error handler
//!     → request timeout
//!     → input pipeline
//!     → panic catcher → route groups | fallback
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::AppConfig;
use crate::http::error_handler::{global_error_handler, handle_panic, handle_timeout, not_found};
use crate::http::static_files::{serve_static, StaticFiles};
use crate::lifecycle::Shutdown;
use crate::observability::{metrics, request_log};
use crate::pipeline::{run_pipeline, Pipeline};
use crate::resources::Store;
use crate::routing::{RouteGroups, RouteTable};
use crate::security::rate_limit::{self, rate_limit_middleware};
use crate::security::{RateLimitPolicy, RateLimiter, RouterSecurityExt};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Store>,
}

/// HTTP server for the application.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
    limiter: Option<Arc<RateLimiter>>,
}

impl HttpServer {
    /// Create a server with the standard route groups.
    pub fn new(config: AppConfig, store: Arc<Store>) -> Self {
        Self::with_route_groups(config, store, RouteGroups::standard())
    }

    /// Create a server dispatching to the given route groups.
    pub fn with_route_groups(config: AppConfig, store: Arc<Store>, groups: RouteGroups) -> Self {
        let config = Arc::new(config);
        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::in_memory(RateLimitPolicy::from(&config.rate_limit))));

        let state = AppState {
            config: config.clone(),
            store,
        };
        let router = Self::build_router(&config, state, groups, limiter.clone());

        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &AppConfig,
        state: AppState,
        groups: RouteGroups,
        limiter: Option<Arc<RateLimiter>>,
    ) -> Router {
        let table = Arc::new(RouteTable::standard());
        let pipeline = Arc::new(Pipeline::from_config(config));
        tracing::debug!(stages = ?pipeline.stage_names(), "Input pipeline assembled");

        let mut router = groups
            .into_dispatch(&table)
            .fallback(not_found)
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(from_fn_with_state(pipeline, run_pipeline))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_timeout))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
            .layer(from_fn(global_error_handler));

        if let Some(limiter) = limiter {
            router = router.layer(from_fn_with_state(limiter, rate_limit_middleware));
        }

        if config.environment.mode.is_development() {
            router = router.layer(request_log::dev_trace_layer());
        }

        if config.security.enable_headers {
            router = router.with_security_headers(&config.security);
        }

        if config.static_files.enabled {
            let files = Arc::new(StaticFiles::new(config.static_files.root.clone()));
            router = router.layer(from_fn_with_state(files, serve_static));
        }

        router
            .layer(from_fn_with_state(table, metrics::track_metrics))
            .layer(request_log::propagate_request_id_layer())
            .layer(request_log::request_id_layer())
    }

    /// The assembled router, for driving the app without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn rate_limiter(&self) -> Option<&Arc<RateLimiter>> {
        self.limiter.as_ref()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn spawn_sweeper(&self, shutdown: &Shutdown) {
        if let Some(limiter) = &self.limiter {
            let interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            tokio::spawn(rate_limit::run_sweeper(
                limiter.clone(),
                interval,
                shutdown.subscribe(),
            ));
        }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.config.environment.mode,
            "HTTP server starting"
        );

        self.spawn_sweeper(shutdown);

        let mut stop = shutdown.subscribe();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: &Shutdown,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            mode = %self.config.environment.mode,
            "HTTPS server starting"
        );

        self.spawn_sweeper(shutdown);

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let mut stop = shutdown.subscribe();
        let stopper = handle.clone();
        tokio::spawn(async move {
            let _ = stop.recv().await;
            stopper.graceful_shutdown(Some(grace));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("config", &self.config)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
