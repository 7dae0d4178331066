//! Request handlers owned by the composition root.
//!
//! Everything else is served by collaborator route groups.

use crate::models::{FrontendNotBuiltResponse, HealthResponse};
use axum::Json;
use std::sync::Arc;

// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Health check for reverse proxies that strip the `/api` prefix.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check_compat() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// ============================================================================
// Frontend
// ============================================================================

/// Diagnostic served at `/` when the frontend build directory is missing.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Frontend build is missing", body = FrontendNotBuiltResponse)
    ),
    tag = "Frontend"
)]
pub async fn frontend_not_built(
    diagnostic: Arc<FrontendNotBuiltResponse>,
) -> Json<FrontendNotBuiltResponse> {
    Json(FrontendNotBuiltResponse::clone(&diagnostic))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints_are_identical() {
        let Json(api) = health_check().await;
        let Json(compat) = health_check_compat().await;
        assert_eq!(
            serde_json::to_value(api).unwrap(),
            serde_json::to_value(compat).unwrap()
        );
    }

    #[tokio::test]
    async fn test_frontend_not_built_returns_diagnostic() {
        let diagnostic = Arc::new(FrontendNotBuiltResponse::new("/app/web/dist"));
        let Json(body) = frontend_not_built(diagnostic).await;
        assert_eq!(body.error, "Frontend not built");
        assert_eq!(body.expected_path, "/app/web/dist");
    }
}
