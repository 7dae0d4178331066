//! Request/response DTOs with OpenAPI schemas.

use serde::Serialize;
use utoipa::ToSchema;

/// Service name reported by the liveness endpoints.
pub const SERVICE_NAME: &str = "GridBNB Trading System";

/// Service version reported by the liveness endpoints.
pub const SERVICE_VERSION: &str = "v3.2.0";

/// Error string of the degraded-mode diagnostic.
pub const FRONTEND_NOT_BUILT: &str = "Frontend not built";

// ============================================================================
// Health
// ============================================================================

/// Liveness status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// The process is up and routing requests.
    Healthy,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: HealthStatus,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
}

impl HealthResponse {
    /// The fixed liveness body.
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            service: SERVICE_NAME,
            version: SERVICE_VERSION,
        }
    }
}

// ============================================================================
// Frontend diagnostics
// ============================================================================

/// Remediation hints for a missing frontend build.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Troubleshooting {
    /// Check the image build log.
    pub check_docker_build: String,
    /// Check the copy step of the image build.
    pub check_copy_instruction: String,
    /// Check the frontend build output directory.
    pub check_build_output: String,
}

impl Default for Troubleshooting {
    fn default() -> Self {
        Self {
            check_docker_build: "Check the Docker build log and confirm the frontend compiled successfully"
                .to_string(),
            check_copy_instruction:
                "Verify the Dockerfile COPY instruction places the frontend build at the expected path"
                    .to_string(),
            check_build_output:
                "Confirm the frontend build output directory (vite.config.ts build.outDir) is 'dist'"
                    .to_string(),
        }
    }
}

/// Body served at `/` when the frontend build directory is missing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FrontendNotBuiltResponse {
    /// Error label, always `Frontend not built`.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
    /// Build directory that was checked.
    pub expected_path: String,
    /// Remediation hints.
    pub troubleshooting: Troubleshooting,
}

impl FrontendNotBuiltResponse {
    /// Builds the diagnostic for the build directory `expected_path`.
    #[must_use]
    pub fn new(expected_path: impl Into<String>) -> Self {
        Self {
            error: FRONTEND_NOT_BUILT.to_string(),
            message: "The frontend build directory does not exist; the web interface is unavailable"
                .to_string(),
            expected_path: expected_path.into(),
            troubleshooting: Troubleshooting::default(),
        }
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Body returned by a collaborator slot with no implementation wired in.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubsystemUnavailableResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: &'static str,
    /// Name of the unavailable collaborator.
    pub subsystem: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "healthy",
                "service": "GridBNB Trading System",
                "version": "v3.2.0"
            })
        );
    }

    #[test]
    fn test_frontend_not_built_serialization() {
        let response = FrontendNotBuiltResponse::new("/app/web/dist");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "Frontend not built");
        assert_eq!(json["expected_path"], "/app/web/dist");
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert!(json["troubleshooting"]["check_docker_build"].is_string());
        assert!(json["troubleshooting"]["check_copy_instruction"].is_string());
        assert!(json["troubleshooting"]["check_build_output"].is_string());
    }

    #[test]
    fn test_subsystem_unavailable_serialization() {
        let response = SubsystemUnavailableResponse {
            error: "Subsystem not connected: logs".to_string(),
            code: "SUBSYSTEM_UNAVAILABLE",
            subsystem: "logs",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":\"SUBSYSTEM_UNAVAILABLE\""));
        assert!(json.contains("\"subsystem\":\"logs\""));
    }
}
