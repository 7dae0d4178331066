//! # GridBNB Server - HTTP Composition Root
//!
//! Assembles the independently developed subsystems of the GridBNB trading
//! backend into one [Axum](https://crates.io/crates/axum) router and serves
//! the single-page frontend from its build directory.
//!
//! Subsystem logic lives elsewhere. This crate decides *where* things are
//! mounted and *in which order*, because the order is what guarantees:
//!
//! - **Liveness first**: `/api/health` and `/health` answer in every state,
//!   including when the frontend build is missing.
//!
//! - **API before frontend**: every collaborator is mounted before the SPA
//!   catch-all, and the catch-all never answers for `/api/...`.
//!
//! - **Graceful degradation**: a missing or partial frontend build selects a
//!   reduced serving mode instead of failing startup.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route table, collaborator registry, handlers, CORS, OpenAPI |
//! | [`config`] | TOML configuration |
//! | [`error`] | Startup and request error types |
//! | [`frontend`] | Build inspection and serving-mode selection |
//! | [`lifecycle`] | Startup/shutdown hooks around `axum::serve` |
//! | [`models`] | Response DTOs with OpenAPI schemas |
//! | [`placeholder`] | Stand-in collaborators for the standalone binary |
//! | [`state`] | Dependency container shared with collaborators |
//!
//! ## Route Precedence
//!
//! ```text
//! /api/health, /health                 liveness (always)
//! /api/auth                            authentication
//! /api/configs                         configuration + configuration history
//! /api/templates                       configuration templates
//! /api/sse                             real-time push
//! /api/dashboard                       dashboard
//! /api/logs                            logs
//! /api/trades                          trade history
//! /api                                 system monitoring
//! /api/grid-strategies...              grid strategy (mounted without prefix)
//! /metrics                             public metrics (undocumented)
//! /docs, /openapi.json                 API documentation
//! /assets/*                            static assets      (assets-only, full)
//! /                                    build diagnostic   (degraded)
//! /{*path}                             page shell         (partial, full)
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use axum::Router;
//! use axum::routing::{get, post};
//! use gridbnb_server::api::{Collaborators, Subsystem, create_router};
//! use gridbnb_server::config::Config;
//! use gridbnb_server::frontend::FrontendBuild;
//! use gridbnb_server::lifecycle::{LoggingHooks, serve, shutdown_signal};
//! use gridbnb_server::state::AppState;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let state = AppState::new().into_shared();
//!
//! let collaborators = gridbnb_server::placeholder::collaborators()
//!     .with_router(
//!         Subsystem::Auth,
//!         Router::new().route("/login", post(|| async { "token" })),
//!     )
//!     .with_public_metrics(get(|| async { "gridbnb_up 1\n" }));
//!
//! let frontend = FrontendBuild::inspect("/app/web/dist");
//! let app = create_router(state, collaborators, &frontend, &config)?;
//!
//! let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;
//! serve(listener, app.router, &LoggingHooks, shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod frontend;
pub mod lifecycle;
pub mod models;
pub mod placeholder;
pub mod state;
