//! Database port: runs `db` action requests.

use std::future::Future;

use badger_domain::action::DbRequest;
use badger_domain::error::BadgerError;

/// Executes database operations on behalf of `db` actions.
///
/// The request carries the action's `args` bag after templating; the
/// implementation decides what `command`, `function`, `procedure` and
/// `query` mean for its backend. Must be safe to call concurrently.
pub trait DatabaseRunner {
    /// Run one database operation.
    fn run_action(&self, request: DbRequest)
    -> impl Future<Output = Result<(), BadgerError>> + Send;
}

impl<T: DatabaseRunner + Send + Sync> DatabaseRunner for std::sync::Arc<T> {
    fn run_action(
        &self,
        request: DbRequest,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send {
        (**self).run_action(request)
    }
}
