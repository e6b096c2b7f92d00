use askama::Template;
use axum::response::IntoResponse;
use service_core::error::AppError;

pub const ROUTE_NOT_FOUND: &str = "Route not found";

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub version: &'static str,
}

/// GET /
pub async fn index() -> impl IntoResponse {
    IndexTemplate {
        version: env!("CARGO_PKG_VERSION"),
    }
}

/// Catch-all for unknown paths and unsupported methods on known ones.
pub async fn route_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!(ROUTE_NOT_FOUND))
}
