//! Route configuration.
//!
//! Routes are registered in a fixed sequence:
//!
//! 1. liveness endpoints,
//! 2. collaborator route groups in [`Subsystem::MOUNT_ORDER`],
//! 3. the public metrics endpoint,
//! 4. API documentation,
//! 5. the frontend serving mode selected at startup.
//!
//! The sequence is mirrored in a [`RouteTable`] that is validated before the
//! router is handed out; the SPA catch-all, when present, is always the last
//! record.

use crate::api::docs::ApiDoc;
use crate::api::subsystems::{Collaborators, RouteGroup, Subsystem};
use crate::api::{handlers, middleware};
use crate::config::Config;
use crate::error::ServerError;
use crate::frontend::{ASSETS_PREFIX, FrontendBuild, ServingMode, SpaShell};
use crate::state::SharedState;
use axum::Router;
use axum::handler::Handler;
use axum::http::{Method, Uri};
use axum::routing::{MethodRouter, get};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Liveness path under the API prefix.
pub const HEALTH_API_PATH: &str = "/api/health";

/// Liveness path for proxies that strip `/api`.
pub const HEALTH_PATH: &str = "/health";

/// Unauthenticated metrics snapshot.
pub const PUBLIC_METRICS_PATH: &str = "/metrics";

/// Swagger UI.
pub const DOCS_PATH: &str = "/docs";

/// OpenAPI document.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Prefix shared by every API route.
pub const API_PREFIX: &str = "/api";

/// Root path, served by the diagnostic in degraded mode.
pub const ROOT_PATH: &str = "/";

/// Pattern reported for the static asset mount.
pub const ASSETS_PATTERN: &str = "/assets/{*path}";

/// Pattern reported for the SPA catch-all.
pub const CATCH_ALL_PATTERN: &str = "/{*path}";

/// What a registration serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// Health check.
    Liveness,
    /// A collaborator route group.
    Subsystem(Subsystem),
    /// Public metrics snapshot.
    PublicMetrics,
    /// Swagger UI and OpenAPI document.
    Docs,
    /// Missing-build diagnostic at `/`.
    FrontendDiagnostic,
    /// Static asset directory.
    StaticAssets,
    /// Page shell for every unclaimed path.
    SpaCatchAll,
}

impl RouteKind {
    /// Returns true for registrations made by the frontend resolver.
    #[must_use]
    pub const fn is_frontend(self) -> bool {
        matches!(
            self,
            RouteKind::FrontendDiagnostic | RouteKind::StaticAssets | RouteKind::SpaCatchAll
        )
    }
}

/// One registration, in the order it was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// Path or prefix pattern.
    pub pattern: String,
    /// What is served.
    pub kind: RouteKind,
    /// Documentation tag, if the registration is documented.
    pub tag: Option<&'static str>,
}

impl RouteRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(pattern: impl Into<String>, kind: RouteKind, tag: Option<&'static str>) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
            tag,
        }
    }

    /// Record for a mounted collaborator group. Root-merged groups report `/`.
    #[must_use]
    pub fn subsystem(subsystem: Subsystem) -> Self {
        let prefix = subsystem.prefix();
        let pattern = if prefix.is_empty() { ROOT_PATH } else { prefix };
        Self::new(pattern, RouteKind::Subsystem(subsystem), Some(subsystem.tag()))
    }
}

/// Ordered, append-only list of registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&mut self, record: RouteRecord) {
        self.records.push(record);
    }

    /// Records in registration order.
    #[must_use]
    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    /// Patterns in registration order.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.pattern.as_str()).collect()
    }

    /// Patterns registered by the frontend resolver, in order.
    #[must_use]
    pub fn frontend_patterns(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.kind.is_frontend())
            .map(|r| r.pattern.as_str())
            .collect()
    }

    /// Returns true if a record of `kind` exists.
    #[must_use]
    pub fn contains(&self, kind: RouteKind) -> bool {
        self.records.iter().any(|r| r.kind == kind)
    }

    /// One line per externally relevant entry point, with full URLs on `bind_addr`.
    #[must_use]
    pub fn summary(&self, mode: ServingMode, bind_addr: &str) -> Vec<String> {
        let url = |path: &str| format!("http://{}{}", bind_addr, path);
        let mut lines = Vec::new();

        let liveness: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.kind == RouteKind::Liveness)
            .map(|r| url(r.pattern.as_str()))
            .collect();
        lines.push(format!("Health check: {}", liveness.join(", ")));

        if self.contains(RouteKind::PublicMetrics) {
            lines.push(format!("Metrics: {}", url(PUBLIC_METRICS_PATH)));
        }
        if self.contains(RouteKind::Docs) {
            lines.push(format!(
                "API docs: {} (OpenAPI: {})",
                url(DOCS_PATH),
                url(OPENAPI_PATH)
            ));
        }

        lines.push(format!("Frontend mode: {}", mode));
        if self.contains(RouteKind::SpaCatchAll) {
            lines.push(format!("Frontend: {}", url(ROOT_PATH)));
        } else if self.contains(RouteKind::FrontendDiagnostic) {
            lines.push(format!("Frontend diagnostic: {}", url(ROOT_PATH)));
        } else {
            lines.push("Frontend: not served".to_string());
        }
        if self.contains(RouteKind::StaticAssets) {
            lines.push(format!("Static assets: {}/", url(ASSETS_PREFIX)));
        }

        lines
    }

    /// Checks the ordering invariants.
    ///
    /// - the SPA catch-all appears at most once and is the last record;
    /// - every liveness record precedes every other record;
    /// - no record is registered twice;
    /// - patterns are absolute and carry no trailing slash.
    ///
    /// # Errors
    /// Returns [`ServerError::RouteOrder`] describing the first violation.
    pub fn validate(&self) -> Result<(), ServerError> {
        let last = self.records.len().saturating_sub(1);
        let catch_alls: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.kind == RouteKind::SpaCatchAll)
            .map(|(i, _)| i)
            .collect();
        if catch_alls.len() > 1 {
            return Err(ServerError::RouteOrder(format!(
                "catch-all registered {} times",
                catch_alls.len()
            )));
        }
        if let Some(&index) = catch_alls.first()
            && index != last
        {
            return Err(ServerError::RouteOrder(format!(
                "catch-all at position {} is followed by {}",
                index, self.records[index + 1].pattern
            )));
        }

        let mut seen_other = None;
        for record in &self.records {
            match (record.kind, seen_other) {
                (RouteKind::Liveness, Some(other)) => {
                    return Err(ServerError::RouteOrder(format!(
                        "liveness route {} registered after {}",
                        record.pattern, other
                    )));
                }
                (RouteKind::Liveness, None) => {}
                (_, None) => seen_other = Some(record.pattern.as_str()),
                (_, Some(_)) => {}
            }
        }

        let mut unique = HashSet::new();
        for record in &self.records {
            if !unique.insert((record.pattern.as_str(), record.kind)) {
                return Err(ServerError::RouteOrder(format!(
                    "{} registered twice",
                    record.pattern
                )));
            }
            let pattern = record.pattern.as_str();
            if !pattern.starts_with('/') || (pattern.len() > 1 && pattern.ends_with('/')) {
                return Err(ServerError::RouteOrder(format!(
                    "malformed pattern '{}'",
                    pattern
                )));
            }
        }

        Ok(())
    }
}

/// The assembled application.
#[derive(Debug)]
pub struct ComposedApp {
    /// Router ready to be served.
    pub router: Router,
    /// Registrations in order.
    pub routes: RouteTable,
    /// Frontend serving mode.
    pub mode: ServingMode,
}

/// Creates the application router.
///
/// # Errors
/// Fails if the CORS policy is invalid, if any collaborator is missing or
/// fails to construct, or if the registration sequence violates
/// [`RouteTable::validate`]. No partial router is returned.
pub fn create_router(
    state: SharedState,
    collaborators: Collaborators,
    frontend: &FrontendBuild,
    config: &Config,
) -> Result<ComposedApp, ServerError> {
    let cors = middleware::cors_layer(&config.cors)?;

    // Health check
    let mut builder = RouteBuilder::new()
        .route(
            HEALTH_API_PATH,
            get(handlers::health_check),
            RouteKind::Liveness,
            Some("Health"),
        )
        .route(
            HEALTH_PATH,
            get(handlers::health_check_compat),
            RouteKind::Liveness,
            Some("Health"),
        );

    // Collaborators
    let built = collaborators.build_all(&state)?;
    for (subsystem, group) in built.groups {
        builder = builder.mount(subsystem, group);
    }

    // Public metrics, outside the documented API
    builder = builder.route(
        PUBLIC_METRICS_PATH,
        built.public_metrics,
        RouteKind::PublicMetrics,
        None,
    );

    // Documentation
    if config.docs.enabled {
        builder = builder.merge(
            SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()),
            RouteRecord::new(DOCS_PATH, RouteKind::Docs, None),
        );
    }

    info!("All API routes registered");

    // Frontend
    let (router, routes) = mount_frontend(builder, frontend).finish()?;

    info!("Key endpoints:");
    for line in routes.summary(frontend.mode(), &config.server.bind_addr()) {
        info!("   {}", line);
    }

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(ComposedApp {
        router,
        routes,
        mode: frontend.mode(),
    })
}

/// Registers the frontend serving mode. Must run after every other registration.
fn mount_frontend(mut builder: RouteBuilder, frontend: &FrontendBuild) -> RouteBuilder {
    let mode = frontend.mode();

    if mode.serves_diagnostic() {
        let diagnostic = Arc::new(frontend.diagnostic());
        builder = builder.route(
            ROOT_PATH,
            get(move || handlers::frontend_not_built(Arc::clone(&diagnostic))),
            RouteKind::FrontendDiagnostic,
            Some("Frontend"),
        );
    }

    if mode.mounts_assets() {
        builder = builder.assets(ServeDir::new(frontend.assets_dir()));
    }

    if mode.serves_spa() {
        let shell = Arc::new(SpaShell::new(
            frontend.index_file(),
            vec![API_PREFIX.to_string(), ASSETS_PREFIX.to_string()],
        ));
        builder = builder.fallback(move |method: Method, uri: Uri| {
            let shell = Arc::clone(&shell);
            async move { shell.serve(method, uri).await }
        });
    }

    info!("Frontend serving mode: {}", mode);
    builder
}

/// Router under construction together with its [`RouteTable`].
///
/// Every registration goes through one of these methods, so the table
/// always matches what the router serves.
struct RouteBuilder {
    router: Router<SharedState>,
    routes: RouteTable,
}

impl RouteBuilder {
    fn new() -> Self {
        Self {
            router: Router::new(),
            routes: RouteTable::new(),
        }
    }

    fn route(
        mut self,
        path: &str,
        handler: MethodRouter<SharedState>,
        kind: RouteKind,
        tag: Option<&'static str>,
    ) -> Self {
        self.router = self.router.route(path, handler);
        self.routes.push(RouteRecord::new(path, kind, tag));
        self
    }

    /// Nests a collaborator group under its prefix, or merges it at the root.
    fn mount(mut self, subsystem: Subsystem, group: RouteGroup) -> Self {
        let prefix = subsystem.prefix();
        self.router = if prefix.is_empty() {
            self.router.merge(group)
        } else {
            self.router.nest(prefix, group)
        };
        let record = RouteRecord::subsystem(subsystem);
        info!(
            "Mounted {} routes at {} [{}]",
            subsystem,
            record.pattern,
            subsystem.tag()
        );
        self.routes.push(record);
        self
    }

    fn merge<R>(mut self, other: R, record: RouteRecord) -> Self
    where
        R: Into<Router<SharedState>>,
    {
        self.router = self.router.merge(other);
        self.routes.push(record);
        self
    }

    fn assets(mut self, dir: ServeDir) -> Self {
        self.router = self.router.nest_service(ASSETS_PREFIX, dir);
        self.routes.push(RouteRecord::new(
            ASSETS_PATTERN,
            RouteKind::StaticAssets,
            None,
        ));
        self
    }

    fn fallback<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, SharedState>,
        T: 'static,
    {
        self.router = self.router.fallback(handler);
        self.routes.push(RouteRecord::new(
            CATCH_ALL_PATTERN,
            RouteKind::SpaCatchAll,
            None,
        ));
        self
    }

    /// Validates the table and hands out both halves.
    fn finish(self) -> Result<(Router<SharedState>, RouteTable), ServerError> {
        self.routes.validate()?;
        Ok((self.router, self.routes))
    }
}
