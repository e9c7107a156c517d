//! Port definitions: traits that adapters implement.
//!
//! Actions reach the outside world through these collaborators. They are
//! defined here (in `app`) so that the executor and the adapters can both
//! depend on them without creating circular dependencies.

pub mod api;
pub mod database;

pub use api::ApiClient;
pub use database::DatabaseRunner;
