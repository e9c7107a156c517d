use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::event::ExecutionContext;
use crate::token::replace_event_tokens;

/// Call against the remote API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAction {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub method: String,
    /// Body fields, sent for `POST`/`PATCH`-style methods.
    #[serde(
        default,
        deserialize_with = "deserialize_data",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub data: BTreeMap<String, String>,
}

/// Resolved call handed to the API collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: String,
    pub endpoint: String,
    pub data: BTreeMap<String, String>,
}

impl ApiAction {
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// # Errors
    ///
    /// Fails when the endpoint or the method is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.endpoint.is_empty() {
            return Err(ValidationError::MissingEndpoint);
        }
        if self.method.is_empty() {
            return Err(ValidationError::MissingMethod);
        }
        Ok(())
    }

    /// Substitute event tokens into the method, the endpoint and every data
    /// value. Data keys are never rewritten.
    #[must_use]
    pub fn request(&self, ctx: Option<&ExecutionContext>) -> ApiRequest {
        let Some(ctx) = ctx else {
            return ApiRequest {
                method: self.method.clone(),
                endpoint: self.endpoint.clone(),
                data: self.data.clone(),
            };
        };
        ApiRequest {
            method: replace_event_tokens(&self.method, Some(ctx)),
            endpoint: replace_event_tokens(&self.endpoint, Some(ctx)),
            data: self
                .data
                .iter()
                .map(|(key, value)| (key.clone(), replace_event_tokens(value, Some(ctx))))
                .collect(),
        }
    }
}

/// Accept scalar data values (`count: 3`, `enabled: true`) as their text.
fn deserialize_data<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(serde::de::Error::custom(format!(
                        "data value for '{key}' must be a scalar"
                    )));
                }
            };
            Ok((key, text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn should_require_endpoint_then_method() {
        assert_eq!(
            ApiAction::new("GET", "").validate(),
            Err(ValidationError::MissingEndpoint)
        );
        assert_eq!(
            ApiAction::new("", "/profiles/").validate(),
            Err(ValidationError::MissingMethod)
        );
        assert!(ApiAction::new("GET", "/profiles/").validate().is_ok());
    }

    #[test]
    fn should_coerce_scalar_data_values() {
        let action: ApiAction = serde_json::from_value(json!({
            "endpoint": "/customers",
            "method": "PATCH",
            "data": {"count": 3, "active": true, "name": "acme"}
        }))
        .unwrap();
        assert_eq!(action.data["count"], "3");
        assert_eq!(action.data["active"], "true");
        assert_eq!(action.data["name"], "acme");
    }

    #[test]
    fn should_reject_nested_data_values() {
        let result: Result<ApiAction, _> = serde_json::from_value(json!({
            "endpoint": "/customers",
            "method": "POST",
            "data": {"nested": {"x": 1}}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn should_substitute_method_endpoint_and_values() {
        let ctx = ExecutionContext::new("pull.complete", "accounts", json!({"id": 42}));
        let action = ApiAction::new("POST", "/customers/$EVENT_PAYLOAD[id]/")
            .with_data("$EVENT_TYPE", "$EVENT_SOURCE");

        let request = action.request(Some(&ctx));

        assert_eq!(request.method, "POST");
        assert_eq!(request.endpoint, "/customers/42/");
        assert_eq!(request.data["$EVENT_TYPE"], "accounts");
    }

    #[test]
    fn should_pass_through_without_context() {
        let action = ApiAction::new("GET", "/profiles/$EVENT_TYPE");
        assert_eq!(action.request(None).endpoint, "/profiles/$EVENT_TYPE");
    }
}
