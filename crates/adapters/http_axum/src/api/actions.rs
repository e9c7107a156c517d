//! On-demand action runs.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use badger_app::ports::{ApiClient, DatabaseRunner};
use badger_domain::action::ActionConfig;
use badger_domain::event::Event;

use super::EventBody;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for running one action.
#[derive(Debug, Deserialize)]
pub struct RunActionRequest {
    #[serde(flatten)]
    pub action: ActionConfig,
    /// Optional event to template against.
    #[serde(default)]
    pub event: Option<EventBody>,
}

/// Request body for the `type:value` shorthand.
#[derive(Debug, Deserialize)]
pub struct TriggerActionRequest {
    pub action: String,
}

/// Possible responses from the run endpoints.
pub enum RunResponse {
    NoContent,
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `POST /api/actions/run`: Run one action, optionally against an event.
pub async fn run<D, A>(
    State(state): State<AppState<D, A>>,
    Json(req): Json<RunActionRequest>,
) -> Result<RunResponse, ApiError>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    let context = req
        .event
        .map(|body| Arc::new(Event::from(body).context()));
    state.engine.run_action(&req.action, context).await?;
    Ok(RunResponse::NoContent)
}

/// `POST /api/actions/trigger`: Run a `db:…`, `api:…` or `exec:…` shorthand.
pub async fn trigger<D, A>(
    State(state): State<AppState<D, A>>,
    Json(req): Json<TriggerActionRequest>,
) -> Result<RunResponse, ApiError>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    let config = ActionConfig::from_shorthand(&req.action)
        .map_err(badger_domain::error::BadgerError::from)?;
    state.engine.run_action(&config, None).await?;
    Ok(RunResponse::NoContent)
}
