//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use natours::config::AppConfig;
use natours::http::HttpServer;
use natours::lifecycle::Shutdown;
use natours::resources::Store;
use natours::routing::RouteGroups;

/// Address every oneshot request appears to come from.
pub const CLIENT_ADDR: ([u8; 4], u16) = ([203, 0, 113, 7], 51000);

/// Default config with the static root pointing at this crate's `public/`.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.static_files.root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public");
    config
}

/// The full application router with a mocked peer address.
pub fn app(config: AppConfig) -> Router {
    app_with_groups(config, RouteGroups::standard())
}

pub fn app_with_groups(config: AppConfig, groups: RouteGroups) -> Router {
    HttpServer::with_route_groups(config, Arc::new(Store::new()), groups)
        .router()
        .layer(MockConnectInfo(SocketAddr::from(CLIENT_ADDR)))
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_accept(uri: &str, accept: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ACCEPT, accept)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    json_request("POST", uri, body)
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Serve the app on an ephemeral port. Trigger the returned handle to stop it.
pub async fn spawn_server(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config, Arc::new(Store::new()));
    let stop = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, &stop).await.unwrap();
    });

    (addr, shutdown)
}
