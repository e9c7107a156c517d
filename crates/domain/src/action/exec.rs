use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::event::ExecutionContext;
use crate::shell::Platform;
use crate::token::replace_event_tokens;

/// Runs a command, through the platform shell unless `use_shell` is `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawExecAction")]
pub struct ExecAction {
    pub command: String,
    /// Direct argv, only valid with `use_shell: false`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Unset means `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_shell: Option<bool>,
}

/// Decoding shape accepted for `exec` args. Every field is optional so that
/// configurations predating `args`/`use_shell` keep decoding, and `null`
/// counts as absent.
#[derive(Deserialize)]
struct RawExecAction {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
    #[serde(default)]
    use_shell: Option<bool>,
}

impl From<RawExecAction> for ExecAction {
    fn from(raw: RawExecAction) -> Self {
        Self {
            command: raw.command.unwrap_or_default(),
            args: raw.args.unwrap_or_default(),
            use_shell: raw.use_shell,
        }
    }
}

/// Fully resolved description of a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables added on top of the inherited environment.
    pub env: Vec<(String, String)>,
    pub use_shell: bool,
}

impl Invocation {
    /// Human readable command line, for logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ExecAction {
    pub fn shell(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn direct<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            use_shell: Some(false),
        }
    }

    #[must_use]
    pub fn use_shell(&self) -> bool {
        self.use_shell.unwrap_or(true)
    }

    /// # Errors
    ///
    /// Fails on a blank command, or on `args` combined with shell dispatch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.command.trim().is_empty() {
            return Err(ValidationError::EmptyCommand);
        }
        if self.use_shell() && !self.args.is_empty() {
            return Err(ValidationError::ShellArgs);
        }
        Ok(())
    }

    /// Resolve the process to spawn for this action.
    ///
    /// With a bound context the command (and, in direct mode, each argument)
    /// goes through token substitution and the `BADGER_EVENT_*` variables
    /// are added to the environment.
    #[must_use]
    pub fn invocation(&self, ctx: Option<&ExecutionContext>, platform: Platform) -> Invocation {
        let use_shell = self.use_shell();
        let command = match ctx {
            Some(ctx) => replace_event_tokens(&self.command, Some(ctx)),
            None => self.command.clone(),
        };
        let env = ctx.map(event_env).unwrap_or_default();

        if use_shell {
            let shell = platform.shell();
            return Invocation {
                program: shell.program.to_string(),
                args: vec![shell.flag.to_string(), command],
                env,
                use_shell,
            };
        }

        let args = match ctx {
            Some(ctx) => self
                .args
                .iter()
                .map(|arg| replace_event_tokens(arg, Some(ctx)))
                .collect(),
            None => self.args.clone(),
        };
        Invocation {
            program: command,
            args,
            env,
            use_shell,
        }
    }
}

/// `BADGER_EVENT_*` variables describing the event. JSON variables are
/// omitted when the payload cannot be encoded, the text one when it is empty.
fn event_env(ctx: &ExecutionContext) -> Vec<(String, String)> {
    let mut env = vec![
        ("BADGER_EVENT_TYPE".to_string(), ctx.event_type().to_string()),
        ("BADGER_EVENT_SOURCE".to_string(), ctx.source().to_string()),
    ];
    if let Some(json) = ctx.event_json() {
        env.push(("BADGER_EVENT_JSON".to_string(), json));
    }
    if let Some(json) = ctx.payload_json() {
        env.push(("BADGER_EVENT_PAYLOAD_JSON".to_string(), json));
    }
    let text = ctx.payload_text();
    if !text.is_empty() {
        env.push(("BADGER_EVENT_PAYLOAD".to_string(), text));
    }
    env
}
