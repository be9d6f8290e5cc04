use axum::http::StatusCode;

/// Health check endpoint
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
