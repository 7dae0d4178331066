//! API routes module.

pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod subsystems;

pub use routes::{ComposedApp, create_router};
pub use subsystems::{Collaborators, RouteGroup, RouteGroupFactory, Subsystem};
