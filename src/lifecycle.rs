//! Server lifecycle.
//!
//! [`serve`] runs the startup hook, accepts connections until the shutdown
//! future resolves, drains in-flight requests, then runs the shutdown hook.
//! The listener does not accept anything before the startup hook returns.

use crate::error::ServerError;
use axum::Router;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Hooks run around the serving phase.
pub trait LifecycleHooks: Send + Sync {
    /// Runs once before the first connection is accepted.
    ///
    /// # Errors
    /// An error aborts the start; the server never accepts traffic.
    fn on_startup(&self) -> Result<(), ServerError> {
        Ok(())
    }

    /// Runs once after the server stopped accepting connections and
    /// in-flight requests completed.
    fn on_shutdown(&self) {}
}

/// Hooks that only log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHooks;

impl LifecycleHooks for LoggingHooks {
    fn on_startup(&self) -> Result<(), ServerError> {
        info!("GridBNB web server starting");
        Ok(())
    }

    fn on_shutdown(&self) {
        info!("GridBNB web server stopped");
    }
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// # Errors
/// Returns the startup hook's error, or an I/O error from the server.
pub async fn serve<H, F>(
    listener: TcpListener,
    router: Router,
    hooks: &H,
    shutdown: F,
) -> Result<(), ServerError>
where
    H: LifecycleHooks + ?Sized,
    F: Future<Output = ()> + Send + 'static,
{
    hooks.on_startup()?;

    if let Ok(addr) = listener.local_addr() {
        info!("Listening on {}", addr);
    }

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await;

    hooks.on_shutdown();
    result.map_err(ServerError::from)
}

/// Resolves on Ctrl-C, or on SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHooks {
        started: AtomicUsize,
        stopped: AtomicUsize,
    }

    impl LifecycleHooks for CountingHooks {
        fn on_startup(&self) -> Result<(), ServerError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_shutdown(&self) {
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct RefusingHooks;

    impl LifecycleHooks for RefusingHooks {
        fn on_startup(&self) -> Result<(), ServerError> {
            Err(ServerError::Startup("refused".to_string()))
        }

        fn on_shutdown(&self) {
            panic!("shutdown must not run when startup failed");
        }
    }

    #[tokio::test]
    async fn test_hooks_run_once_each() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new().route("/", get(|| async { "ok" }));
        let hooks = CountingHooks::default();

        serve(listener, router, &hooks, async {}).await.unwrap();

        assert_eq!(hooks.started.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.stopped.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failing_startup_aborts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new();

        let result = serve(listener, router, &RefusingHooks, async {}).await;
        assert!(matches!(result, Err(ServerError::Startup(_))));
    }

    #[test]
    fn test_default_hooks_succeed() {
        struct Silent;
        impl LifecycleHooks for Silent {}

        assert!(Silent.on_startup().is_ok());
        assert!(LoggingHooks.on_startup().is_ok());
    }
}
