//! Events and the per-occurrence execution context handed to actions.
//!
//! An [`Event`] is what the host dispatches ("`pull.complete` from
//! `accounts` with this payload"). Before running the matching rules it is
//! turned into an [`ExecutionContext`], which is immutable from the outside
//! and only lazily fills one cache: the normalized, traversable form of the
//! payload used by `$EVENT_PAYLOAD[path]` lookups.

use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;
use serde_json::Value;

use crate::id::EventId;

/// The payload attached to an event.
///
/// Payloads are not statically typed: they may be structured JSON, a plain
/// rendering of some value (an error message, an identifier), or a typed
/// value captured through its `Serialize` implementation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    /// No payload.
    #[default]
    Empty,
    /// Generic maps, sequences and scalars, traversed as-is.
    Json(Value),
    /// A value reduced to its text rendering (errors, identifiers, …).
    Text(String),
    /// A typed value captured through serde. `Ok` holds its JSON encoding,
    /// `Err` its debug rendering when encoding failed.
    Encoded(Result<String, String>),
}

impl Payload {
    /// Capture a value through its text rendering.
    pub fn display(value: &impl fmt::Display) -> Self {
        Self::Text(value.to_string())
    }

    /// Capture a typed value through its `Serialize` implementation.
    ///
    /// Encoding failures are not fatal: the payload keeps a debug rendering
    /// and only the JSON views of it become unavailable.
    pub fn serialized<T: Serialize + fmt::Debug>(value: &T) -> Self {
        Self::Encoded(serde_json::to_string(value).map_err(|_| format!("{value:?}")))
    }

    fn normalize(&self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Json(value) => Some(value.clone()),
            Self::Text(text) => Some(Value::String(text.clone())),
            Self::Encoded(Ok(json)) => serde_json::from_str(json).ok(),
            Self::Encoded(Err(_)) => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Something that happened and may trigger event actions.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    /// Event type, e.g. `"pull.complete"`.
    pub event_type: String,
    /// Where the event came from, e.g. `"accounts"`. May be empty.
    pub source: String,
    pub payload: Payload,
}

impl Event {
    /// Create a new event with a fresh identifier.
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type: event_type.into(),
            source: source.into(),
            payload: payload.into(),
        }
    }

    /// Build the execution context shared by every action this event triggers.
    #[must_use]
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(
            self.event_type.clone(),
            self.source.clone(),
            self.payload.clone(),
        )
    }
}

/// Event metadata made available to actions for templating.
///
/// Created once per event occurrence and shared (behind an `Arc`) by every
/// step that runs for it. The normalized payload is computed at most once,
/// even when several threads ask for it concurrently.
#[derive(Debug)]
pub struct ExecutionContext {
    event_type: String,
    source: String,
    payload: Payload,
    normalized: OnceLock<Option<Value>>,
}

impl ExecutionContext {
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            source: source.into(),
            payload: payload.into(),
            normalized: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The `{type, source, payload}` envelope encoded as JSON.
    ///
    /// `None` when the payload has no JSON encoding. A typed payload is
    /// embedded with its encoding verbatim.
    #[must_use]
    pub fn event_json(&self) -> Option<String> {
        if let Payload::Encoded(Ok(json)) = &self.payload {
            let event_type = serde_json::to_string(&self.event_type).ok()?;
            let source = serde_json::to_string(&self.source).ok()?;
            return Some(format!(
                r#"{{"type":{event_type},"source":{source},"payload":{json}}}"#
            ));
        }
        let payload = self.payload_value()?;
        let envelope = Envelope {
            event_type: &self.event_type,
            source: &self.source,
            payload: payload.as_ref(),
        };
        serde_json::to_string(&envelope).ok()
    }

    /// The payload alone encoded as JSON (`null` when there is none).
    #[must_use]
    pub fn payload_json(&self) -> Option<String> {
        match &self.payload {
            Payload::Encoded(Ok(json)) => Some(json.clone()),
            _ => serde_json::to_string(self.payload_value()?.as_ref()).ok(),
        }
    }

    /// Best-effort plain text rendering of the payload. Empty when there is
    /// no payload.
    #[must_use]
    pub fn payload_text(&self) -> String {
        match &self.payload {
            Payload::Empty | Payload::Json(Value::Null) => String::new(),
            Payload::Json(Value::String(text)) | Payload::Text(text) => text.clone(),
            Payload::Json(value) => value.to_string(),
            Payload::Encoded(Ok(json)) => match self.payload_root() {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) => String::new(),
                _ => json.clone(),
            },
            Payload::Encoded(Err(text)) => text.clone(),
        }
    }

    /// The normalized payload used for path lookups.
    ///
    /// Structured JSON is used as-is; every other shape is normalized on
    /// first access and cached for the lifetime of the context.
    #[must_use]
    pub fn payload_root(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Empty => None,
            Payload::Json(value) => Some(value),
            other => self.normalized.get_or_init(|| other.normalize()).as_ref(),
        }
    }

    /// Resolve a dotted path (`account.tags.1`) against the payload and
    /// render the value found there.
    ///
    /// Returns `None` when any segment cannot be resolved.
    #[must_use]
    pub fn payload_field(&self, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let mut current = self.payload_root()?;
        for segment in path.split('.') {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        render_scalar(current)
    }

    /// Value form of untyped payloads. Typed payloads are rendered from their
    /// encoding instead.
    fn payload_value(&self) -> Option<Cow<'_, Value>> {
        match &self.payload {
            Payload::Empty => Some(Cow::Owned(Value::Null)),
            Payload::Json(value) => Some(Cow::Borrowed(value)),
            Payload::Text(text) => Some(Cow::Owned(Value::String(text.clone()))),
            Payload::Encoded(_) => None,
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    source: &'a str,
    payload: &'a Value,
}

/// Render a resolved payload value as text. `null` counts as a miss.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        nested => Some(nested.to_string()),
    }
}
