//! Token catalog for configuration editors.

use axum::Json;
use axum::extract::Query;
use serde::Deserialize;
use serde_json::Value;

use badger_domain::token::{self, TokenOption};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TokensQuery {
    /// Sample payload, as JSON, whose field paths should be offered.
    pub sample: Option<String>,
}

/// `GET /api/tokens?sample=…`: List insertable tokens.
pub async fn list(Query(query): Query<TokensQuery>) -> Result<Json<Vec<TokenOption>>, ApiError> {
    let sample = query
        .sample
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| serde_json::from_str::<Value>(&raw))
        .transpose()
        .map_err(|err| ApiError::BadRequest(format!("invalid sample payload: {err}")))?;
    Ok(Json(token::catalog(sample.as_ref())))
}
