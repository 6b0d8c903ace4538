use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::web::handlers::{download_missing, download_ready, health, report, upload, upload_form};
use crate::web::state::AppState;

pub fn app_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/", get(upload_form).post(upload))
        .route("/report", get(report))
        .route("/exports/ready", get(download_ready))
        .route("/exports/missing", get(download_missing))
        .route("/health", get(health))
        // Multipart's own 2 MB default is replaced by the configured limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
