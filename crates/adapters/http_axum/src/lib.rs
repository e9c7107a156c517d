//! # badger-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Receive events over HTTP (`POST /api/events`) and dispatch them to the
//!   event action engine
//! - Run single actions on demand (`POST /api/actions/run`,
//!   `POST /api/actions/trigger`)
//! - Expose the configured rules and the token catalog for editors
//! - Map engine results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `badger-app` (for the engine and port traits) and
//! `badger-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
