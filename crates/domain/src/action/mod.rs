//! Actions: the executable steps of an event action.
//!
//! Steps are configured as generic `{type, args}` records ([`ActionConfig`]).
//! [`Action::from_config`] is the only place where the open `args` bag is
//! projected onto a typed variant; everything downstream works with the typed
//! [`ExecAction`], [`DbAction`] or [`ApiAction`].
//!
//! Actions here only *describe* their side effect (see
//! [`ExecAction::invocation`], [`DbAction::request`], [`ApiAction::request`]).
//! Running them is done by the application layer.

mod api;
mod db;
mod exec;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use self::api::{ApiAction, ApiRequest};
pub use self::db::{DB_OPERATION_KEYS, DbAction, DbRequest};
pub use self::exec::{ExecAction, Invocation};

use crate::error::{ActionConfigError, ValidationError};

/// The closed set of known action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Exec,
    Db,
    Api,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exec => "exec",
            Self::Db => "db",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exec" => Ok(Self::Exec),
            "db" => Ok(Self::Db),
            "api" => Ok(Self::Api),
            other => Err(ActionConfigError::UnknownType(other.to_string())),
        }
    }
}

/// Generic, serialization-neutral representation of one step.
///
/// `kind` is kept as a plain string so that configurations naming an unknown
/// type still load; the error surfaces when the step is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    #[serde(rename = "type")]
    pub kind: String,
    /// A missing or `null` bag decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub args: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ActionConfig {
    pub fn new(kind: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    /// Parse the `type:value` shorthand used for manual triggers.
    ///
    /// - `db:<name>` runs the named database command,
    /// - `api:<endpoint>` issues a `GET` against the endpoint,
    /// - `exec:<command>` runs the command through the shell.
    ///
    /// # Errors
    ///
    /// Returns [`ActionConfigError::InvalidShorthand`] when there is no `:`
    /// separator and [`ActionConfigError::UnknownType`] for other prefixes.
    pub fn from_shorthand(input: &str) -> Result<Self, ActionConfigError> {
        let (kind, value) = input
            .split_once(':')
            .ok_or_else(|| ActionConfigError::InvalidShorthand(input.to_string()))?;

        let mut args = Map::new();
        match kind.parse::<ActionKind>()? {
            ActionKind::Db | ActionKind::Exec => {
                args.insert("command".into(), Value::String(value.to_string()));
            }
            ActionKind::Api => {
                args.insert("endpoint".into(), Value::String(value.to_string()));
                args.insert("method".into(), Value::String("GET".into()));
            }
        }
        Ok(Self::new(kind, args))
    }
}

/// A typed, executable step.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Exec(ExecAction),
    Db(DbAction),
    Api(ApiAction),
}

impl Action {
    /// Build the typed action for a generic `{type, args}` record.
    ///
    /// Unknown keys in `args` are ignored and missing ones are left empty:
    /// required fields are checked by [`Action::validate`], not here.
    ///
    /// # Errors
    ///
    /// Returns [`ActionConfigError::UnknownType`] for an unknown `type` and
    /// [`ActionConfigError::InvalidArgs`] when `args` has the wrong shape for
    /// the variant (e.g. `command` is a number).
    pub fn from_config(config: &ActionConfig) -> Result<Self, ActionConfigError> {
        let kind: ActionKind = config.kind.parse()?;
        let args = Value::Object(config.args.clone());
        let invalid = |source| ActionConfigError::InvalidArgs { kind, source };

        let action = match kind {
            ActionKind::Exec => Self::Exec(serde_json::from_value(args).map_err(invalid)?),
            ActionKind::Db => Self::Db(serde_json::from_value(args).map_err(invalid)?),
            ActionKind::Api => Self::Api(serde_json::from_value(args).map_err(invalid)?),
        };
        Ok(action)
    }

    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Exec(_) => ActionKind::Exec,
            Self::Db(_) => ActionKind::Db,
            Self::Api(_) => ActionKind::Api,
        }
    }

    /// Check the variant's invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Exec(action) => action.validate(),
            Self::Db(action) => action.validate(),
            Self::Api(action) => action.validate(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exec(action) => write!(f, "exec({})", action.command),
            Self::Db(action) => write!(f, "db({})", action.operations().collect::<Vec<_>>().join(",")),
            Self::Api(action) => write!(f, "api({} {})", action.method, action.endpoint),
        }
    }
}
