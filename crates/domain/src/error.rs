//! Common error types used across the workspace.
//!
//! Each concern gets its own typed error; [`BadgerError`] unifies them via
//! `#[from]` so callers can use `?` across layers. Collaborator failures
//! (database, remote API) are boxed and rendered transparently so the host
//! sees them verbatim.

use std::fmt;

use crate::action::ActionKind;

/// Top-level error for everything an action run can report.
#[derive(Debug, thiserror::Error)]
pub enum BadgerError {
    /// The `{type, args}` record could not be turned into an action.
    #[error(transparent)]
    Config(#[from] ActionConfigError),

    /// A decoded action or rule violates its invariants.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The process backing an `exec` action failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Error reported by the database collaborator.
    #[error(transparent)]
    Database(Box<dyn std::error::Error + Send + Sync>),

    /// Error reported by the remote API collaborator.
    #[error(transparent)]
    Api(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised while building an action from its generic configuration.
#[derive(Debug, thiserror::Error)]
pub enum ActionConfigError {
    #[error("unknown action type: {0}")]
    UnknownType(String),

    #[error("failed to unmarshal args for action type '{kind}': {source}")]
    InvalidArgs {
        kind: ActionKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid action format: {0}")]
    InvalidShorthand(String),
}

/// Invariant violations caught by `validate()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("exec action requires a 'command'")]
    EmptyCommand,

    #[error("exec action 'args' are only supported when use_shell is set to false")]
    ShellArgs,

    #[error("db action requires one of 'command', 'function', 'procedure', or 'query'")]
    MissingDbOperation,

    #[error("api action requires an 'endpoint'")]
    MissingEndpoint,

    #[error("api action requires a 'method'")]
    MissingMethod,

    #[error("event action requires a 'name'")]
    EmptyName,

    #[error("event action '{0}' requires an 'event'")]
    EmptyEvent(String),

    #[error("event action '{0}' has no steps to run")]
    NoSteps(String),
}

/// Failures while running a child process.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read output of '{program}': {source}")]
    Capture {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit. `output` is the trimmed combined stdout/stderr, if any.
    #[error("{status}{}", OutputSuffix(.output))]
    ProcessFailed {
        status: String,
        output: Option<String>,
    },
}

struct OutputSuffix<'a>(&'a Option<String>);

impl fmt::Display for OutputSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(output) => write!(f, ": {output}"),
            None => Ok(()),
        }
    }
}
