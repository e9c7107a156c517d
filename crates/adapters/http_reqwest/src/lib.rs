//! # badger-adapter-http-reqwest
//!
//! Remote API adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `ApiClient` port defined in `badger-app::ports::api`
//! - Authenticate with the configured API key (`Authorization: Token …`)
//! - Encode `data` as a form body and surface unexpected statuses as errors
//!
//! ## Dependency rule
//! Depends on `badger-app` (for port traits) and `badger-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod client;
mod error;

pub use client::{Config, ReqwestApiClient};
pub use error::HttpClientError;
