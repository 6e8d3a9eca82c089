//! Static asset serving.
//!
//! Requests whose path names an existing file under the public root are
//! answered directly and never reach the rest of the chain.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeFile;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate file for a request path. Paths that try to leave the root are refused.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.trim_start_matches('/'));
        if relative.as_os_str().is_empty() {
            return None;
        }
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        safe.then(|| self.root.join(relative))
    }
}

/// Middleware answering GET and HEAD requests for existing files.
pub async fn serve_static(
    State(files): State<Arc<StaticFiles>>,
    request: Request,
    next: Next,
) -> Response {
    if !matches!(*request.method(), Method::GET | Method::HEAD) {
        return next.run(request).await;
    }
    let Some(path) = files.resolve(request.uri().path()) else {
        return next.run(request).await;
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {
            tracing::trace!(path = %path.display(), "Serving static file");
            match ServeFile::new(&path).oneshot(request).await {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            }
        }
        _ => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let files = StaticFiles::new("public");
        assert_eq!(files.resolve("/css/style.css"), Some(PathBuf::from("public/css/style.css")));
        assert_eq!(files.resolve("/"), None);
        assert_eq!(files.resolve("/../Cargo.toml"), None);
        assert_eq!(files.resolve("/css/../../secret"), None);
    }
}
