use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::event::ExecutionContext;
use crate::token::{replace_event_tokens, replace_in_value};

/// Keys naming the database operation. At least one must be present; the
/// database collaborator decides which one wins when several are.
pub const DB_OPERATION_KEYS: [&str; 4] = ["command", "function", "procedure", "query"];

const NESTED_ARGS_KEY: &str = "args";

/// Database operation. The `args` bag is kept verbatim, including keys
/// unknown here, and forwarded to the database collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbAction {
    pub args: Map<String, Value>,
}

/// What the database collaborator receives: `{type: "db", args}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub args: Map<String, Value>,
}

impl DbRequest {
    #[must_use]
    pub fn new(args: Map<String, Value>) -> Self {
        Self {
            kind: "db".to_string(),
            args,
        }
    }

    /// The string held under `key`, if any.
    #[must_use]
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Positional parameters from the nested `args` sequence.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        self.args
            .get(NESTED_ARGS_KEY)
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }
}

impl DbAction {
    /// Operation keys present in `args`, in [`DB_OPERATION_KEYS`] order.
    pub fn operations(&self) -> impl Iterator<Item = &'static str> + '_ {
        DB_OPERATION_KEYS
            .into_iter()
            .filter(|key| self.args.contains_key(*key))
    }

    /// # Errors
    ///
    /// Fails when none of [`DB_OPERATION_KEYS`] is present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.operations().next().is_none() {
            return Err(ValidationError::MissingDbOperation);
        }
        Ok(())
    }

    /// Build the request for one run.
    ///
    /// Always works on a deep copy of `args`. With a bound context, string
    /// operation keys and everything nested under `args` go through token
    /// substitution, and the `event_*` fields are added unless already set.
    #[must_use]
    pub fn request(&self, ctx: Option<&ExecutionContext>) -> DbRequest {
        let mut args = self.args.clone();
        if let Some(ctx) = ctx {
            apply_context(&mut args, ctx);
        }
        DbRequest::new(args)
    }
}

fn apply_context(args: &mut Map<String, Value>, ctx: &ExecutionContext) {
    for key in DB_OPERATION_KEYS {
        if let Some(Value::String(text)) = args.get_mut(key) {
            *text = replace_event_tokens(text, Some(ctx));
        }
    }
    if let Some(nested) = args.get_mut(NESTED_ARGS_KEY) {
        *nested = replace_in_value(nested, Some(ctx));
    }

    if !ctx.event_type().is_empty() {
        insert_missing(args, "event_type", || Some(ctx.event_type().to_string()));
    }
    if !ctx.source().is_empty() {
        insert_missing(args, "event_source", || Some(ctx.source().to_string()));
    }
    insert_missing(args, "event_json", || ctx.event_json());
    insert_missing(args, "event_payload_json", || ctx.payload_json());
}

fn insert_missing(args: &mut Map<String, Value>, key: &str, value: impl FnOnce() -> Option<String>) {
    if args.contains_key(key) {
        return;
    }
    if let Some(value) = value() {
        args.insert(key.to_string(), Value::String(value));
    }
}
