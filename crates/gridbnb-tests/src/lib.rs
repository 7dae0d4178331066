//! Integration tests for the GridBNB web server.
//!
//! Each test starts the real router on an ephemeral local port with fake
//! collaborators and a throwaway frontend build directory, then talks to it
//! over HTTP.

use axum::Json;
use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::routing::{get, post};
use gridbnb_server::api::{Collaborators, Subsystem, create_router};
use gridbnb_server::config::Config;
use gridbnb_server::frontend::{FrontendBuild, ServingMode};
use gridbnb_server::lifecycle::{LoggingHooks, serve};
use gridbnb_server::state::{AppState, SharedState};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Page shell written by [`BuildDir::with_index`].
pub const INDEX_HTML: &str =
    "<!doctype html><html><head><title>GridBNB</title></head><body><div id=\"app\"></div></body></html>";

/// Asset written by [`BuildDir::with_assets`].
pub const APP_JS: &str = "console.log(\"gridbnb\");";

/// Body of the fake public metrics endpoint.
pub const METRICS_BODY: &str = "gridbnb_up 1\n";

/// Temporary location for a frontend build, removed on drop.
#[derive(Debug)]
pub struct BuildDir {
    root: PathBuf,
    dist: PathBuf,
}

impl BuildDir {
    /// Reserves a unique location; the `dist` directory is not created.
    #[must_use]
    pub fn missing() -> Self {
        let root = std::env::temp_dir().join(format!("gridbnb-test-{}", uuid::Uuid::new_v4()));
        let dist = root.join("web").join("dist");
        Self { root, dist }
    }

    /// Creates an empty `dist` directory.
    #[must_use]
    pub fn empty() -> Self {
        let dir = Self::missing();
        fs::create_dir_all(&dir.dist).expect("create dist directory");
        dir
    }

    /// Adds `assets/app.js`.
    #[must_use]
    pub fn with_assets(self) -> Self {
        let assets = self.dist.join("assets");
        fs::create_dir_all(&assets).expect("create assets directory");
        fs::write(assets.join("app.js"), APP_JS).expect("write app.js");
        self
    }

    /// Adds `index.html`.
    #[must_use]
    pub fn with_index(self) -> Self {
        fs::write(self.dist.join("index.html"), INDEX_HTML).expect("write index.html");
        self
    }

    /// Builds a directory for `mode`.
    #[must_use]
    pub fn for_mode(mode: ServingMode) -> Self {
        match mode {
            ServingMode::Degraded => Self::missing(),
            ServingMode::Partial => Self::empty().with_index(),
            ServingMode::AssetsOnly => Self::empty().with_assets(),
            ServingMode::Full => Self::empty().with_assets().with_index(),
            ServingMode::Empty => Self::empty(),
        }
    }

    /// The build directory path.
    #[must_use]
    pub fn dist(&self) -> &Path {
        &self.dist
    }
}

impl Drop for BuildDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// A running server.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// Selected frontend mode.
    pub mode: ServingMode,
    /// HTTP client.
    pub client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Full URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a GET request to `path`.
    ///
    /// # Panics
    /// Panics if the request fails at the transport level.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed")
    }

    /// Stops the server and waits for it to drain.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Fake collaborators: each group answers with its own name.
#[must_use]
pub fn fake_collaborators() -> Collaborators {
    Collaborators::new()
        .with_router(
            Subsystem::Auth,
            Router::new().route("/login", post(|| async { Json(json!({"subsystem": "auth"})) })),
        )
        .with_router(
            Subsystem::Config,
            Router::new().route("/", get(|| async { Json(json!({"subsystem": "config"})) })),
        )
        .with_router(
            Subsystem::ConfigHistory,
            Router::new().route(
                "/{config_id}/history",
                get(|UrlPath(config_id): UrlPath<String>| async move {
                    Json(json!({"subsystem": "history", "config_id": config_id}))
                }),
            ),
        )
        .with_router(
            Subsystem::ConfigTemplates,
            Router::new().route("/", get(|| async { Json(json!({"subsystem": "template"})) })),
        )
        .with_router(
            Subsystem::Sse,
            Router::new().route("/events", get(|| async { "data: connected\n\n" })),
        )
        .with_router(
            Subsystem::Dashboard,
            Router::new().route(
                "/status",
                get(|State(state): State<SharedState>| async move {
                    Json(json!({"subsystem": "dashboard", "traders": state.symbols()}))
                }),
            ),
        )
        .with_router(
            Subsystem::Logs,
            Router::new().route("/list", get(|| async { Json(json!({"subsystem": "logs"})) })),
        )
        .with_router(
            Subsystem::Trades,
            Router::new().route("/list", get(|| async { Json(json!({"subsystem": "trades"})) })),
        )
        .with_router(
            Subsystem::Metrics,
            Router::new().route(
                "/metrics",
                get(|| async { Json(json!({"subsystem": "metrics"})) }),
            ),
        )
        .with_router(
            Subsystem::GridStrategy,
            Router::new()
                .route(
                    "/api/grid-strategies",
                    get(|| async { Json(json!({"subsystem": "grid_strategy"})) }),
                )
                .route(
                    "/api/grid-strategies/templates/{template_name}",
                    post(|UrlPath(name): UrlPath<String>| async move {
                        Json(json!({"subsystem": "grid_strategy", "template": name}))
                    }),
                ),
        )
        .with_public_metrics(get(|| async { METRICS_BODY }))
}

/// Starts a server for `build` with default configuration.
pub async fn spawn_app(build: &BuildDir) -> TestServer {
    spawn_app_with(build, Config::default(), AppState::new()).await
}

/// Starts a server for `build` with the given configuration and state.
pub async fn spawn_app_with(build: &BuildDir, config: Config, state: AppState) -> TestServer {
    spawn_composed(build, config, state, fake_collaborators()).await
}

/// Starts a server for `build` with the given collaborators.
///
/// # Panics
/// Panics if composition or binding fails.
pub async fn spawn_composed(
    build: &BuildDir,
    config: Config,
    state: AppState,
    collaborators: Collaborators,
) -> TestServer {
    let frontend = FrontendBuild::inspect(build.dist());
    let app = create_router(state.into_shared(), collaborators, &frontend, &config)
        .expect("composition should succeed");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    let (tx, rx) = oneshot::channel::<()>();
    let router = app.router;
    let handle = tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        serve(listener, router, &LoggingHooks, shutdown)
            .await
            .expect("server error");
    });

    TestServer {
        base_url: format!("http://{}", addr),
        mode: app.mode,
        client: reqwest::Client::new(),
        shutdown: Some(tx),
        handle: Some(handle),
    }
}
