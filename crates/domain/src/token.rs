//! Event token substitution.
//!
//! Recognized tokens (case-sensitive):
//!
//! | Token | Value |
//! |-------|-------|
//! | `$EVENT_TYPE` | event type |
//! | `$EVENT_SOURCE` | event source |
//! | `$EVENT_JSON` | `{type, source, payload}` envelope as JSON |
//! | `$EVENT_PAYLOAD_JSON` | payload as JSON |
//! | `$EVENT_PAYLOAD` | payload as plain text |
//! | `$EVENT_PAYLOAD[a.b.0]` | one field of the payload |
//!
//! The input is scanned once, left to right, so substituted values are never
//! themselves re-scanned for tokens.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use crate::event::ExecutionContext;

pub const EVENT_TYPE: &str = "$EVENT_TYPE";
pub const EVENT_SOURCE: &str = "$EVENT_SOURCE";
pub const EVENT_JSON: &str = "$EVENT_JSON";
pub const EVENT_PAYLOAD_JSON: &str = "$EVENT_PAYLOAD_JSON";
pub const EVENT_PAYLOAD: &str = "$EVENT_PAYLOAD";

/// Payload paths are not expanded past this depth in the token catalog.
const MAX_CATALOG_DEPTH: usize = 4;

const LABEL_SEPARATOR: &str = " › ";

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(
            r"\$EVENT_(?:PAYLOAD\[([^\]]+)\]|PAYLOAD_JSON|PAYLOAD|JSON|TYPE|SOURCE)",
        )
        .expect("token pattern is valid")
    })
}

/// Replace every recognized event token in `input`.
///
/// Scalar tokens whose value is empty are left as literal text. Unresolved
/// `$EVENT_PAYLOAD[path]` lookups become the empty string. Without a context
/// only the `$EVENT_PAYLOAD[path]` tokens are touched (stripped); everything
/// else passes through unchanged.
#[must_use]
pub fn replace_event_tokens(input: &str, ctx: Option<&ExecutionContext>) -> String {
    if !input.contains("$EVENT_") {
        return input.to_string();
    }

    let replaced = token_re().replace_all(input, |caps: &Captures<'_>| {
        let matched = &caps[0];
        if let Some(path) = caps.get(1) {
            return ctx
                .and_then(|ctx| ctx.payload_field(path.as_str()))
                .unwrap_or_default();
        }
        let Some(ctx) = ctx else {
            return matched.to_string();
        };
        let value = match matched {
            EVENT_TYPE => Some(ctx.event_type().to_string()),
            EVENT_SOURCE => Some(ctx.source().to_string()),
            EVENT_JSON => ctx.event_json(),
            EVENT_PAYLOAD_JSON => ctx.payload_json(),
            _ => Some(ctx.payload_text()),
        };
        value
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| matched.to_string())
    });

    match replaced {
        Cow::Borrowed(unchanged) => unchanged.to_string(),
        Cow::Owned(changed) => changed,
    }
}

/// Apply [`replace_event_tokens`] to every string nested inside `value`.
///
/// Maps and sequences are walked recursively; other scalars are kept.
#[must_use]
pub fn replace_in_value(value: &Value, ctx: Option<&ExecutionContext>) -> Value {
    match value {
        Value::String(text) => Value::String(replace_event_tokens(text, ctx)),
        Value::Array(items) => Value::Array(items.iter().map(|v| replace_in_value(v, ctx)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| (key.clone(), replace_in_value(v, ctx)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// One insertable token, as offered to configuration editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenOption {
    pub label: String,
    /// The token text. For options that require a path this is a format
    /// string where `%s` stands for the path.
    pub token: String,
    pub requires_path: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl TokenOption {
    fn scalar(label: &str, token: &str) -> Self {
        Self {
            label: format!("{label} ({token})"),
            token: token.to_string(),
            requires_path: false,
            placeholder: None,
        }
    }

    fn custom_path() -> Self {
        Self {
            label: "Custom payload field… ($EVENT_PAYLOAD[path])".to_string(),
            token: "$EVENT_PAYLOAD[%s]".to_string(),
            requires_path: true,
            placeholder: Some("e.g. data.id".to_string()),
        }
    }

    fn payload_path(path: &[&str]) -> Self {
        let token = format!("$EVENT_PAYLOAD[{}]", path.join("."));
        let label = format!("Payload{LABEL_SEPARATOR}{}", path.join(LABEL_SEPARATOR));
        Self {
            label: format!("{label} ({token})"),
            token,
            requires_path: false,
            placeholder: None,
        }
    }
}

/// List the tokens an editor can offer.
///
/// The five scalar tokens come first, then one option per field path found in
/// the optional `sample` payload, then the free-form custom path option.
#[must_use]
pub fn catalog(sample: Option<&Value>) -> Vec<TokenOption> {
    let mut options = vec![
        TokenOption::scalar("Event Type", EVENT_TYPE),
        TokenOption::scalar("Event Source", EVENT_SOURCE),
        TokenOption::scalar("Event JSON", EVENT_JSON),
        TokenOption::scalar("Event Payload JSON", EVENT_PAYLOAD_JSON),
        TokenOption::scalar("Event Payload Text", EVENT_PAYLOAD),
    ];
    if let Some(sample) = sample {
        let mut prefix = Vec::new();
        collect_paths(sample, &mut prefix, &mut options);
    }
    options.push(TokenOption::custom_path());
    options
}

fn collect_paths<'a>(value: &'a Value, prefix: &mut Vec<&'a str>, out: &mut Vec<TokenOption>) {
    if !prefix.is_empty() {
        out.push(TokenOption::payload_path(prefix));
    }
    let Value::Object(map) = value else {
        return;
    };
    if prefix.len() >= MAX_CATALOG_DEPTH {
        return;
    }
    for (key, child) in map {
        prefix.push(key);
        collect_paths(child, prefix, out);
        prefix.pop();
    }
}
