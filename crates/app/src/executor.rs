//! The executor: collaborators plus the context of the event being handled.

use std::sync::Arc;

use badger_domain::event::ExecutionContext;
use badger_domain::shell::Platform;

/// Holds the database and API collaborators and, for one event run, the
/// execution context actions template against.
///
/// The base executor lives for the whole application run. Each event gets a
/// context-bound copy from [`Executor::with_context`]; collaborators are
/// shared through `Arc`, so binding never touches the base executor.
#[derive(Debug)]
pub struct Executor<D, A> {
    db: Arc<D>,
    api: Arc<A>,
    platform: Platform,
    context: Option<Arc<ExecutionContext>>,
}

impl<D, A> Clone for Executor<D, A> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            api: Arc::clone(&self.api),
            platform: self.platform,
            context: self.context.clone(),
        }
    }
}

impl<D, A> Executor<D, A> {
    /// Create a base executor without a context.
    pub fn new(db: D, api: A) -> Self {
        Self::from_shared(Arc::new(db), Arc::new(api))
    }

    /// Create a base executor from already shared collaborators.
    pub fn from_shared(db: Arc<D>, api: Arc<A>) -> Self {
        Self {
            db,
            api,
            platform: Platform::current(),
            context: None,
        }
    }

    /// Shallow copy carrying `context`.
    #[must_use]
    pub fn with_context(&self, context: Arc<ExecutionContext>) -> Self {
        Self {
            context: Some(context),
            ..self.clone()
        }
    }

    /// The context of the current run, if one is bound.
    #[must_use]
    pub fn context(&self) -> Option<&ExecutionContext> {
        self.context.as_deref()
    }

    #[must_use]
    pub fn db(&self) -> &D {
        &self.db
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{RecordingApi, RecordingDatabase};

    fn base() -> Executor<RecordingDatabase, RecordingApi> {
        Executor::new(RecordingDatabase::default(), RecordingApi::default())
    }

    #[test]
    fn should_start_without_context() {
        assert!(base().context().is_none());
    }

    #[test]
    fn should_bind_context_without_touching_base() {
        let base = base();
        let ctx = Arc::new(ExecutionContext::new("pull.start", "accounts", json!(null)));

        let bound = base.with_context(Arc::clone(&ctx));

        assert!(base.context().is_none());
        assert_eq!(bound.context().map(ExecutionContext::event_type), Some("pull.start"));
        assert!(std::ptr::eq(base.db(), bound.db()));
        assert!(std::ptr::eq(base.api(), bound.api()));
    }

    #[test]
    fn should_keep_bound_executors_independent() {
        let base = base();
        let first = base.with_context(Arc::new(ExecutionContext::new("a", "", json!(null))));
        let second = base.with_context(Arc::new(ExecutionContext::new("b", "", json!(null))));

        assert_eq!(first.context().map(ExecutionContext::event_type), Some("a"));
        assert_eq!(second.context().map(ExecutionContext::event_type), Some("b"));
    }

    #[test]
    fn should_use_host_platform() {
        assert_eq!(base().platform(), Platform::current());
    }
}
