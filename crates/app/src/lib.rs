//! # badger-app
//!
//! Application layer: executor, **port definitions** (traits) and the event
//! action engine.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DatabaseRunner`: runs `db` action requests
//!   - `ApiClient`: raw calls against the remote API
//! - Provide the `Executor` that binds collaborators and the per-event
//!   execution context
//! - Implement the `Execute` capability for every action variant, including
//!   the child process runner behind `exec`
//! - Provide the `EventActionEngine` that matches events to rules and runs
//!   their steps in order, fail-fast per rule
//!
//! ## Dependency rule
//! Depends on `badger-domain` only (plus `tokio::process` for child processes).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod engine;
pub mod execute;
pub mod executor;
pub mod ports;
pub mod process;

#[cfg(test)]
mod testing;
