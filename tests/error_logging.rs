//! Unexpected errors reach the log with their real cause.

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::get as route_get;
use axum::Router;
use serde_json::json;

use natours::error::AppError;
use natours::http::AppState;
use natours::routing::{RouteGroup, RouteGroups};

use common::*;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unexpected_error_is_logged_and_masked() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let failing: Router<AppState> = Router::new().route(
        "/",
        route_get(|| async { Err::<(), _>(AppError::unexpected("database connection lost")) }),
    );
    let groups = RouteGroups::standard().replace(RouteGroup::Tours, failing);
    let app = app_with_groups(test_config(), groups);

    let response = send(&app, get("/api/v1/tours")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "status": "error", "message": "Something went very wrong!" })
    );

    let logged = buffer.contents();
    assert!(logged.contains("ERROR"), "log was: {logged}");
    assert!(logged.contains("Unexpected error"), "log was: {logged}");
    assert!(logged.contains("database connection lost"), "log was: {logged}");
    assert!(logged.contains("/api/v1/tours"), "log was: {logged}");
}
