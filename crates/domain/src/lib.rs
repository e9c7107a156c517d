//! # badger-domain
//!
//! Pure domain model for badger event actions.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions
//! - Define the **execution context** (event type, source, payload) and its
//!   lazily normalized, traversable payload
//! - Define the **token engine** that injects event metadata into strings
//!   (`$EVENT_TYPE`, `$EVENT_PAYLOAD[account.id]`, …)
//! - Define the **action variants** (`exec`, `db`, `api`), their argument
//!   shapes, validation rules and the factory that builds them from generic
//!   `{type, args}` records
//! - Define **event actions** (event → ordered steps rules)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It never spawns processes, opens sockets or touches a database: actions
//! only describe *what* to run. Executing them is the job of `badger-app`.

pub mod error;
pub mod id;

pub mod action;
pub mod event;
pub mod rule;
pub mod shell;
pub mod token;
