//! Collaborator route groups and their mount points.
//!
//! Every collaborator owns its handlers; this module only knows where each
//! one is mounted, under which documentation tag, and in which order.

use crate::error::{BoxError, ServerError};
use crate::state::SharedState;
use axum::Router;
use axum::routing::MethodRouter;
use std::collections::HashMap;
use std::fmt;

/// Route group produced by a collaborator.
pub type RouteGroup = Router<SharedState>;

/// The collaborators wired into the server, in mount order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subsystem {
    /// Login and token handling.
    Auth,
    /// Trading configuration CRUD.
    Config,
    /// Configuration change history.
    ConfigHistory,
    /// Configuration templates.
    ConfigTemplates,
    /// Server-sent event stream.
    Sse,
    /// Runtime status dashboard.
    Dashboard,
    /// Log viewer.
    Logs,
    /// Trade history.
    Trades,
    /// System monitoring.
    Metrics,
    /// Grid strategy management.
    GridStrategy,
}

impl Subsystem {
    /// Mount order. Earlier groups are registered first.
    pub const MOUNT_ORDER: [Subsystem; 10] = [
        Subsystem::Auth,
        Subsystem::Config,
        Subsystem::ConfigHistory,
        Subsystem::ConfigTemplates,
        Subsystem::Sse,
        Subsystem::Dashboard,
        Subsystem::Logs,
        Subsystem::Trades,
        Subsystem::Metrics,
        Subsystem::GridStrategy,
    ];

    /// Stable identifier used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Subsystem::Auth => "auth",
            Subsystem::Config => "config",
            Subsystem::ConfigHistory => "history",
            Subsystem::ConfigTemplates => "template",
            Subsystem::Sse => "sse",
            Subsystem::Dashboard => "dashboard",
            Subsystem::Logs => "logs",
            Subsystem::Trades => "trades",
            Subsystem::Metrics => "metrics",
            Subsystem::GridStrategy => "grid_strategy",
        }
    }

    /// Path prefix the group is nested under. Empty means merged at the root.
    ///
    /// Configuration and its history share `/api/configs`.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Subsystem::Auth => "/api/auth",
            Subsystem::Config | Subsystem::ConfigHistory => "/api/configs",
            Subsystem::ConfigTemplates => "/api/templates",
            Subsystem::Sse => "/api/sse",
            Subsystem::Dashboard => "/api/dashboard",
            Subsystem::Logs => "/api/logs",
            Subsystem::Trades => "/api/trades",
            Subsystem::Metrics => "/api",
            Subsystem::GridStrategy => "",
        }
    }

    /// OpenAPI tag the group's operations are listed under.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Subsystem::Auth => "Authentication",
            Subsystem::Config => "Configuration",
            Subsystem::ConfigHistory => "Configuration History",
            Subsystem::ConfigTemplates => "Configuration Templates",
            Subsystem::Sse => "Real-time Push",
            Subsystem::Dashboard => "Dashboard",
            Subsystem::Logs => "Logs",
            Subsystem::Trades => "Trade History",
            Subsystem::Metrics => "System Monitoring",
            Subsystem::GridStrategy => "Grid Strategy",
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a collaborator's route group from the shared state.
pub trait RouteGroupFactory: Send + Sync {
    /// Constructs the route group.
    ///
    /// # Errors
    /// Any error aborts server startup.
    fn build(&self, state: &SharedState) -> Result<RouteGroup, BoxError>;
}

impl<F> RouteGroupFactory for F
where
    F: Fn(&SharedState) -> Result<RouteGroup, BoxError> + Send + Sync,
{
    fn build(&self, state: &SharedState) -> Result<RouteGroup, BoxError> {
        self(state)
    }
}

/// Set of collaborator factories plus the public metrics handler.
///
/// Every subsystem in [`Subsystem::MOUNT_ORDER`] and the public metrics
/// handler must be present; [`Collaborators::build_all`] refuses to return a
/// partial set.
#[derive(Default)]
pub struct Collaborators {
    factories: HashMap<Subsystem, Box<dyn RouteGroupFactory>>,
    public_metrics: Option<MethodRouter<SharedState>>,
}

impl Collaborators {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for `subsystem`, replacing any previous one.
    #[must_use]
    pub fn with<F>(mut self, subsystem: Subsystem, factory: F) -> Self
    where
        F: RouteGroupFactory + 'static,
    {
        self.factories.insert(subsystem, Box::new(factory));
        self
    }

    /// Registers an already built route group for `subsystem`.
    #[must_use]
    pub fn with_router(self, subsystem: Subsystem, router: RouteGroup) -> Self {
        self.with(subsystem, move |_: &SharedState| -> Result<RouteGroup, BoxError> {
            Ok(router.clone())
        })
    }

    /// Registers the handler served at the public `/metrics` path.
    #[must_use]
    pub fn with_public_metrics(mut self, handler: MethodRouter<SharedState>) -> Self {
        self.public_metrics = Some(handler);
        self
    }

    /// Returns true if a factory is registered for `subsystem`.
    #[must_use]
    pub fn contains(&self, subsystem: Subsystem) -> bool {
        self.factories.contains_key(&subsystem)
    }

    /// Builds every route group in mount order.
    ///
    /// # Errors
    /// Returns [`ServerError::MissingCollaborator`] if a subsystem or the
    /// public metrics handler is missing, and [`ServerError::Collaborator`]
    /// if a factory fails. Nothing is returned unless all groups built.
    pub fn build_all(self, state: &SharedState) -> Result<BuiltCollaborators, ServerError> {
        let Self {
            mut factories,
            public_metrics,
        } = self;

        let mut groups = Vec::with_capacity(Subsystem::MOUNT_ORDER.len());
        for subsystem in Subsystem::MOUNT_ORDER {
            let factory = factories
                .remove(&subsystem)
                .ok_or(ServerError::MissingCollaborator(subsystem.name()))?;
            let group = factory
                .build(state)
                .map_err(|source| ServerError::Collaborator {
                    name: subsystem.name(),
                    source,
                })?;
            groups.push((subsystem, group));
        }

        let public_metrics =
            public_metrics.ok_or(ServerError::MissingCollaborator("public_metrics"))?;

        Ok(BuiltCollaborators {
            groups,
            public_metrics,
        })
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> = Subsystem::MOUNT_ORDER
            .iter()
            .filter(|s| self.contains(**s))
            .map(|s| s.name())
            .collect();
        f.debug_struct("Collaborators")
            .field("registered", &registered)
            .field("public_metrics", &self.public_metrics.is_some())
            .finish()
    }
}

/// Route groups that all constructed successfully, in mount order.
pub struct BuiltCollaborators {
    /// `(subsystem, group)` pairs in [`Subsystem::MOUNT_ORDER`].
    pub groups: Vec<(Subsystem, RouteGroup)>,
    /// Handler for the public `/metrics` path.
    pub public_metrics: MethodRouter<SharedState>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::routing::get;

    fn full_set() -> Collaborators {
        Subsystem::MOUNT_ORDER
            .iter()
            .fold(Collaborators::new(), |set, subsystem| {
                set.with_router(*subsystem, Router::new())
            })
            .with_public_metrics(get(|| async { "up 1\n" }))
    }

    #[test]
    fn test_mount_order_is_fixed() {
        let names: Vec<&str> = Subsystem::MOUNT_ORDER.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "auth",
                "config",
                "history",
                "template",
                "sse",
                "dashboard",
                "logs",
                "trades",
                "metrics",
                "grid_strategy",
            ]
        );
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(Subsystem::Auth.prefix(), "/api/auth");
        assert_eq!(Subsystem::Config.prefix(), "/api/configs");
        assert_eq!(Subsystem::ConfigHistory.prefix(), "/api/configs");
        assert_eq!(Subsystem::ConfigTemplates.prefix(), "/api/templates");
        assert_eq!(Subsystem::Sse.prefix(), "/api/sse");
        assert_eq!(Subsystem::Dashboard.prefix(), "/api/dashboard");
        assert_eq!(Subsystem::Logs.prefix(), "/api/logs");
        assert_eq!(Subsystem::Trades.prefix(), "/api/trades");
        assert_eq!(Subsystem::Metrics.prefix(), "/api");
        assert_eq!(Subsystem::GridStrategy.prefix(), "");
    }

    #[test]
    fn test_tags_are_unique() {
        let mut tags: Vec<&str> = Subsystem::MOUNT_ORDER.iter().map(|s| s.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), Subsystem::MOUNT_ORDER.len());
    }

    #[test]
    fn test_prefixes_are_well_formed() {
        for subsystem in Subsystem::MOUNT_ORDER {
            let prefix = subsystem.prefix();
            if prefix.is_empty() {
                continue;
            }
            assert!(prefix.starts_with('/'), "{}", subsystem);
            assert!(!prefix.ends_with('/'), "{}", subsystem);
        }
    }

    #[test]
    fn test_build_all_in_order() {
        let state = AppState::new().into_shared();
        let built = full_set().build_all(&state).expect("all collaborators present");
        let order: Vec<Subsystem> = built.groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, Subsystem::MOUNT_ORDER.to_vec());
    }

    #[test]
    fn test_missing_collaborator_fails() {
        let state = AppState::new().into_shared();
        let collaborators = Subsystem::MOUNT_ORDER
            .iter()
            .filter(|s| **s != Subsystem::Logs)
            .fold(Collaborators::new(), |set, subsystem| {
                set.with_router(*subsystem, Router::new())
            })
            .with_public_metrics(get(|| async { "" }));

        let result = collaborators.build_all(&state);
        assert!(matches!(
            result,
            Err(ServerError::MissingCollaborator("logs"))
        ));
    }

    #[test]
    fn test_missing_public_metrics_fails() {
        let state = AppState::new().into_shared();
        let collaborators = Subsystem::MOUNT_ORDER
            .iter()
            .fold(Collaborators::new(), |set, subsystem| {
                set.with_router(*subsystem, Router::new())
            });

        let result = collaborators.build_all(&state);
        assert!(matches!(
            result,
            Err(ServerError::MissingCollaborator("public_metrics"))
        ));
    }

    #[test]
    fn test_failing_factory_aborts() {
        let state = AppState::new().into_shared();
        let collaborators = full_set().with(
            Subsystem::Sse,
            |_: &SharedState| -> Result<RouteGroup, BoxError> { Err("event bus unavailable".into()) },
        );

        match collaborators.build_all(&state) {
            Err(ServerError::Collaborator { name, source }) => {
                assert_eq!(name, "sse");
                assert_eq!(source.to_string(), "event bus unavailable");
            }
            other => panic!("expected collaborator error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_factory_receives_state() {
        let state = AppState::new()
            .with_trader("BNB/USDT", std::sync::Arc::new(()))
            .into_shared();
        let collaborators = full_set().with(
            Subsystem::Dashboard,
            |state: &SharedState| -> Result<RouteGroup, BoxError> {
                if state.trader_count() == 1 {
                    Ok(Router::new())
                } else {
                    Err("expected one trader".into())
                }
            },
        );

        assert!(collaborators.build_all(&state).is_ok());
    }

    #[test]
    fn test_debug_lists_registered() {
        let collaborators = Collaborators::new().with_router(Subsystem::Auth, Router::new());
        let debug = format!("{:?}", collaborators);
        assert!(debug.contains("auth"));
        assert!(debug.contains("public_metrics: false"));
    }
}
