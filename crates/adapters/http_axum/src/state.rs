//! Shared application state for axum handlers.

use std::sync::Arc;

use badger_app::engine::EventActionEngine;
use badger_app::ports::{ApiClient, DatabaseRunner};

/// Application state shared across all axum handlers.
///
/// Generic over the collaborator types to avoid dynamic dispatch. `Clone` is
/// implemented manually so the collaborators themselves do not need to be
/// `Clone`; only the `Arc` is cloned.
pub struct AppState<D, A> {
    /// Rules and base executor.
    pub engine: Arc<EventActionEngine<D, A>>,
}

impl<D, A> Clone for AppState<D, A> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<D, A> AppState<D, A>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    /// Create a new application state around an engine.
    pub fn new(engine: EventActionEngine<D, A>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
