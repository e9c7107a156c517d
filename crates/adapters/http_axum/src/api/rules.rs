//! Configured event actions.

use axum::Json;
use axum::extract::State;

use badger_app::ports::{ApiClient, DatabaseRunner};
use badger_domain::rule::EventAction;

use crate::state::AppState;

/// `GET /api/rules`: List the configured event actions.
pub async fn list<D, A>(State(state): State<AppState<D, A>>) -> Json<Vec<EventAction>>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    Json(state.engine.rules().to_vec())
}
