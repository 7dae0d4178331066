//! Application state management.
//!
//! [`AppState`] is the dependency container handed to every collaborator
//! route group. It is populated once while the application is assembled and
//! shared read-only behind an [`Arc`] afterwards. Trader handles and the
//! trader registry are opaque to this crate; collaborators downcast them to
//! their own concrete types with [`AppState::trader`] and
//! [`AppState::trader_registry`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque handle to a running trader (or trader registry).
pub type TraderHandle = Arc<dyn Any + Send + Sync>;

/// State shared with handlers and collaborator route groups.
pub type SharedState = Arc<AppState>;

/// Application state shared across all handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// Running traders keyed by trading-pair symbol.
    traders: HashMap<String, TraderHandle>,
    /// Optional trader registry.
    trader_registry: Option<TraderHandle>,
}

impl AppState {
    /// Creates an empty application state: no traders, no registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state from optional traders and an optional registry.
    ///
    /// Missing inputs default to an empty map and an absent registry. No
    /// validation is performed.
    #[must_use]
    pub fn from_parts(
        traders: Option<HashMap<String, TraderHandle>>,
        trader_registry: Option<TraderHandle>,
    ) -> Self {
        Self {
            traders: traders.unwrap_or_default(),
            trader_registry,
        }
    }

    /// Adds a trader for `symbol`, replacing any previous one.
    #[must_use]
    pub fn with_trader<T>(mut self, symbol: impl Into<String>, trader: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        self.traders.insert(symbol.into(), trader);
        self
    }

    /// Attaches a trader registry.
    #[must_use]
    pub fn with_trader_registry<R>(mut self, registry: Arc<R>) -> Self
    where
        R: Any + Send + Sync,
    {
        self.trader_registry = Some(registry);
        self
    }

    /// Freezes the state for sharing.
    #[must_use]
    pub fn into_shared(self) -> SharedState {
        Arc::new(self)
    }

    /// Returns the opaque handles keyed by symbol.
    #[must_use]
    pub fn traders(&self) -> &HashMap<String, TraderHandle> {
        &self.traders
    }

    /// Returns the trader for `symbol` if it exists and is a `T`.
    #[must_use]
    pub fn trader<T>(&self, symbol: &str) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let handle = self.traders.get(symbol)?;
        Arc::clone(handle).downcast::<T>().ok()
    }

    /// Returns registered symbols in sorted order.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.traders.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Returns the number of registered traders.
    #[must_use]
    pub fn trader_count(&self) -> usize {
        self.traders.len()
    }

    /// Returns the registry if one is attached and is an `R`.
    #[must_use]
    pub fn trader_registry<R>(&self) -> Option<Arc<R>>
    where
        R: Any + Send + Sync,
    {
        let handle = self.trader_registry.as_ref()?;
        Arc::clone(handle).downcast::<R>().ok()
    }

    /// Returns true if a trader registry is attached.
    #[must_use]
    pub fn has_trader_registry(&self) -> bool {
        self.trader_registry.is_some()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("traders", &self.symbols())
            .field("trader_registry", &self.has_trader_registry())
            .finish()
    }
}
