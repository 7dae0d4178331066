//! OpenAPI documentation.
//!
//! Collaborators contribute their own operations; this document carries the
//! endpoints owned here and one tag per collaborator. The public `/metrics`
//! path is not part of it.

use crate::models::{
    FrontendNotBuiltResponse, HealthResponse, HealthStatus, SubsystemUnavailableResponse,
    Troubleshooting,
};
use utoipa::OpenApi;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health_check,
        crate::api::handlers::health_check_compat,
        crate::api::handlers::frontend_not_built,
    ),
    components(
        schemas(
            HealthResponse,
            HealthStatus,
            FrontendNotBuiltResponse,
            Troubleshooting,
            SubsystemUnavailableResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness endpoints"),
        (name = "Frontend", description = "Frontend build diagnostics"),
        (name = "Authentication", description = "Login and session management"),
        (name = "Configuration", description = "Trading configuration management"),
        (name = "Configuration History", description = "Configuration change history"),
        (name = "Configuration Templates", description = "Configuration templates"),
        (name = "Real-time Push", description = "Server-sent event streams"),
        (name = "Dashboard", description = "Runtime status"),
        (name = "Logs", description = "Log viewer"),
        (name = "Trade History", description = "Executed trades"),
        (name = "System Monitoring", description = "System metrics"),
        (name = "Grid Strategy", description = "Grid strategy management"),
    ),
    info(
        title = "GridBNB Trading System API",
        version = "v3.2.0",
        description = "Backend API of the GridBNB grid trading system",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::subsystems::Subsystem;

    #[test]
    fn test_liveness_paths_documented() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/health"));
        assert!(doc.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_public_metrics_not_documented() {
        let doc = ApiDoc::openapi();
        assert!(!doc.paths.paths.contains_key("/metrics"));
    }

    #[test]
    fn test_every_subsystem_has_a_tag() {
        let doc = ApiDoc::openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.name)
            .collect();
        for subsystem in Subsystem::MOUNT_ORDER {
            assert!(
                tags.iter().any(|t| t == subsystem.tag()),
                "missing tag for {}",
                subsystem
            );
        }
    }

    #[test]
    fn test_info() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.info.title, "GridBNB Trading System API");
        assert_eq!(doc.info.version, "v3.2.0");
    }
}
