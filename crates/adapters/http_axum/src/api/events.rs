//! Inbound events.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

use badger_app::engine::{DispatchReport, RuleOutcome};
use badger_app::ports::{ApiClient, DatabaseRunner};
use badger_domain::event::Event;
use badger_domain::id::EventId;

use super::EventBody;
use crate::error::ApiError;
use crate::state::AppState;

/// JSON rendering of a [`DispatchReport`].
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub event_id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub rules: Vec<RuleResponse>,
}

#[derive(Debug, Serialize)]
pub struct RuleResponse {
    pub name: String,
    pub completed: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepErrorResponse>,
}

#[derive(Debug, Serialize)]
pub struct StepErrorResponse {
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl From<RuleOutcome> for RuleResponse {
    fn from(outcome: RuleOutcome) -> Self {
        Self {
            name: outcome.rule,
            completed: outcome.completed,
            total: outcome.total,
            error: outcome.failure.map(|failure| StepErrorResponse {
                step: failure.step,
                kind: failure.kind,
                message: failure.error.to_string(),
            }),
        }
    }
}

impl From<DispatchReport> for DispatchResponse {
    fn from(report: DispatchReport) -> Self {
        Self {
            success: report.is_success(),
            event_id: report.event_id,
            event_type: report.event_type,
            source: report.source,
            started_at: report.started_at,
            finished_at: report.finished_at,
            rules: report.rules.into_iter().map(RuleResponse::from).collect(),
        }
    }
}

/// Possible responses from the dispatch endpoint.
pub enum DispatchEventResponse {
    Ok(Json<DispatchResponse>),
}

impl IntoResponse for DispatchEventResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/events`: Dispatch an event to every matching rule.
///
/// Step failures are part of the report, not an error response.
pub async fn dispatch<D, A>(
    State(state): State<AppState<D, A>>,
    Json(body): Json<EventBody>,
) -> Result<DispatchEventResponse, ApiError>
where
    D: DatabaseRunner + Send + Sync + 'static,
    A: ApiClient + Send + Sync + 'static,
{
    if body.event_type.trim().is_empty() {
        return Err(ApiError::BadRequest("event 'type' is required".to_string()));
    }
    let event = Event::from(body);
    let report = state.engine.dispatch(&event).await;
    Ok(DispatchEventResponse::Ok(Json(report.into())))
}
