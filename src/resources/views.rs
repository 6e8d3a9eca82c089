//! Views route group: server-rendered pages.

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::Router;

use crate::error::{AppError, AppResult};
use crate::http::extract::Path;
use crate::http::AppState;
use crate::security::sanitize;
use crate::templates;

async fn overview(State(state): State<AppState>) -> Html<String> {
    Html(templates::overview(&state.store.tours.list()))
}

async fn tour(State(state): State<AppState>, Path(slug): Path<String>) -> AppResult<Html<String>> {
    // Route params are resolved after the pipeline ran.
    let slug = sanitize::clean_xss(&slug);
    let tour = state
        .store
        .tours
        .find(|tour| tour.slug == slug)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("There is no tour with that name."))?;
    Ok(Html(templates::tour_detail(&tour)))
}

async fn signup() -> Html<String> {
    Html(templates::signup_form())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/tour/{slug}", get(tour))
        .route("/signup", get(signup))
}
