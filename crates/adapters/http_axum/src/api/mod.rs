//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod events;
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod tokens;

use axum::Router;
use axum::routing::{get, post};

use badger_app::ports::{ApiClient, DatabaseRunner};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<D, A>() -> Router<AppState<D, A>>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    Router::new()
        .route("/events", post(events::dispatch::<D, A>))
        .route("/actions/run", post(actions::run::<D, A>))
        .route("/actions/trigger", post(actions::trigger::<D, A>))
        .route("/rules", get(rules::list::<D, A>))
        .route("/tokens", get(tokens::list))
}

/// Event block shared by the request bodies.
#[derive(Debug, serde::Deserialize)]
pub struct EventBody {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl From<EventBody> for badger_domain::event::Event {
    fn from(body: EventBody) -> Self {
        Self::new(body.event_type, body.source, body.payload)
    }
}
