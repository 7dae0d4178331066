//! Placeholder collaborators.
//!
//! The server binary ships without the trading subsystems linked in. Each
//! slot is filled with a route group that answers `503` for every path under
//! its prefix, so the routing surface stays complete and clients get an
//! explicit answer instead of the page shell. The public metrics placeholder
//! reports what the dependency container holds.

use crate::api::subsystems::{Collaborators, RouteGroup, Subsystem};
use crate::error::BoxError;
use crate::models::SubsystemUnavailableResponse;
use crate::state::SharedState;
use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, any, get};

/// Error code returned by placeholder groups.
pub const SUBSYSTEM_UNAVAILABLE: &str = "SUBSYSTEM_UNAVAILABLE";

/// Returns a complete set of placeholder collaborators.
#[must_use]
pub fn collaborators() -> Collaborators {
    Subsystem::MOUNT_ORDER
        .iter()
        .fold(Collaborators::new(), |set, subsystem| {
            let subsystem = *subsystem;
            set.with(subsystem, move |_: &SharedState| -> Result<RouteGroup, BoxError> {
                Ok(route_group(subsystem))
            })
        })
        .with_public_metrics(get(public_metrics))
}

/// Paths claimed by the placeholder for `subsystem`, relative to its prefix.
///
/// Configuration and its history share a prefix, so history only claims the
/// `history` sub-tree. Metrics is mounted at `/api` and only claims
/// `/metrics` beneath it.
#[must_use]
pub fn paths(subsystem: Subsystem) -> &'static [&'static str] {
    match subsystem {
        Subsystem::ConfigHistory => &["/history", "/history/{*path}"],
        Subsystem::Metrics => &["/metrics", "/metrics/{*path}"],
        Subsystem::GridStrategy => &["/api/grid-strategies", "/api/grid-strategies/{*path}"],
        _ => &["/", "/{*path}"],
    }
}

/// Builds the placeholder route group for `subsystem`.
#[must_use]
pub fn route_group(subsystem: Subsystem) -> RouteGroup {
    paths(subsystem)
        .iter()
        .fold(Router::new(), |router, path| {
            router.route(path, unavailable(subsystem))
        })
}

fn unavailable(subsystem: Subsystem) -> MethodRouter<SharedState> {
    any(move || async move {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(SubsystemUnavailableResponse {
                error: format!("Subsystem not connected: {}", subsystem),
                code: SUBSYSTEM_UNAVAILABLE,
                subsystem: subsystem.name(),
            }),
        )
    })
}

/// Renders a Prometheus text snapshot of the dependency container.
pub async fn public_metrics(State(state): State<SharedState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_metrics(&state),
    )
}

fn render_metrics(state: &crate::state::AppState) -> String {
    format!(
        "# HELP gridbnb_traders_registered Traders held by the server.\n\
         # TYPE gridbnb_traders_registered gauge\n\
         gridbnb_traders_registered {}\n\
         # HELP gridbnb_trader_registry_attached Whether a trader registry is attached.\n\
         # TYPE gridbnb_trader_registry_attached gauge\n\
         gridbnb_trader_registry_attached {}\n",
        state.trader_count(),
        u8::from(state.has_trader_registry()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use std::sync::Arc;

    #[test]
    fn test_placeholders_cover_every_subsystem() {
        let set = collaborators();
        for subsystem in Subsystem::MOUNT_ORDER {
            assert!(set.contains(subsystem), "missing {}", subsystem);
        }
    }

    #[test]
    fn test_placeholders_build() {
        let state = AppState::new().into_shared();
        let built = collaborators().build_all(&state).expect("placeholders build");
        assert_eq!(built.groups.len(), Subsystem::MOUNT_ORDER.len());
    }

    #[test]
    fn test_shared_prefix_paths_do_not_collide() {
        let config = paths(Subsystem::Config);
        let history = paths(Subsystem::ConfigHistory);
        assert!(config.iter().all(|p| !history.contains(p)));
    }

    #[test]
    fn test_grid_strategy_paths_are_absolute() {
        for path in paths(Subsystem::GridStrategy) {
            assert!(path.starts_with("/api/grid-strategies"));
        }
    }

    #[test]
    fn test_render_metrics() {
        let state = AppState::new()
            .with_trader("BNB/USDT", Arc::new(()))
            .with_trader("ETH/USDT", Arc::new(()));
        let body = render_metrics(&state);
        assert!(body.contains("gridbnb_traders_registered 2\n"));
        assert!(body.contains("gridbnb_trader_registry_attached 0\n"));
    }
}
