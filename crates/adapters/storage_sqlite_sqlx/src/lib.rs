//! # badger-adapter-storage-sqlite-sqlx
//!
//! `SQLite` database adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `DatabaseRunner` port defined in `badger-app::ports::database`
//! - Manage `SQLite` connection pool lifecycle
//! - Resolve `db` requests to SQL (named commands or raw queries) and bind
//!   their positional parameters
//!
//! ## Dependency rule
//! Depends on `badger-app` (for port traits) and `badger-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod runner;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use runner::SqliteDatabaseRunner;
