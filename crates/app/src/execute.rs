//! Running actions against an [`Executor`].
//!
//! Each variant resolves its side effect through the domain (invocation,
//! database request, API request), templated with the executor's context,
//! then hands it to the matching collaborator. Callers are expected to have
//! called `validate()` first; nothing is re-validated here.

use std::future::Future;

use badger_domain::action::{Action, ApiAction, DbAction, ExecAction};
use badger_domain::error::BadgerError;

use crate::executor::Executor;
use crate::ports::{ApiClient, DatabaseRunner};
use crate::process;

/// Capability shared by every action variant.
pub trait Execute {
    /// Perform the action's side effect.
    fn execute<D, A>(
        &self,
        executor: &Executor<D, A>,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send
    where
        D: DatabaseRunner + Send + Sync,
        A: ApiClient + Send + Sync;
}

impl Execute for ExecAction {
    fn execute<D, A>(
        &self,
        executor: &Executor<D, A>,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send
    where
        D: DatabaseRunner + Send + Sync,
        A: ApiClient + Send + Sync,
    {
        let invocation = self.invocation(executor.context(), executor.platform());
        async move {
            tracing::debug!(command = %invocation.command_line(), "running command");
            let output = process::run(&invocation).await?;
            tracing::trace!(%output, "command finished");
            Ok(())
        }
    }
}

impl Execute for DbAction {
    fn execute<D, A>(
        &self,
        executor: &Executor<D, A>,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send
    where
        D: DatabaseRunner + Send + Sync,
        A: ApiClient + Send + Sync,
    {
        let request = self.request(executor.context());
        executor.db().run_action(request)
    }
}

impl Execute for ApiAction {
    fn execute<D, A>(
        &self,
        executor: &Executor<D, A>,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send
    where
        D: DatabaseRunner + Send + Sync,
        A: ApiClient + Send + Sync,
    {
        let request = self.request(executor.context());
        let api = executor.api();
        async move {
            api.raw_request(&request.method, &request.endpoint, &request.data)
                .await?;
            Ok(())
        }
    }
}

impl Execute for Action {
    fn execute<D, A>(
        &self,
        executor: &Executor<D, A>,
    ) -> impl Future<Output = Result<(), BadgerError>> + Send
    where
        D: DatabaseRunner + Send + Sync,
        A: ApiClient + Send + Sync,
    {
        async move {
            match self {
                Self::Exec(action) => action.execute(executor).await,
                Self::Db(action) => action.execute(executor).await,
                Self::Api(action) => action.execute(executor).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use badger_domain::action::ActionConfig;
    use badger_domain::event::ExecutionContext;
    use serde_json::{Value, json};

    use super::*;
    use crate::testing::{RecordingApi, RecordingDatabase};

    fn executor() -> Executor<RecordingDatabase, RecordingApi> {
        Executor::new(RecordingDatabase::default(), RecordingApi::default())
    }

    fn context(event_type: &str, source: &str, payload: Value) -> Arc<ExecutionContext> {
        Arc::new(ExecutionContext::new(event_type, source, payload))
    }

    fn db_action(args: Value) -> DbAction {
        serde_json::from_value(args).unwrap()
    }

    #[tokio::test]
    async fn should_forward_templated_db_request() {
        let executor = executor().with_context(context(
            "pull.complete",
            "accounts",
            json!({"account": {"id": 42}}),
        ));
        let action = db_action(json!({
            "query": "UPDATE t SET synced = 1 WHERE id = $EVENT_PAYLOAD[account.id]"
        }));

        action.execute(&executor).await.unwrap();

        let requests = executor.db().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, "db");
        assert_eq!(
            requests[0].str_arg("query"),
            Some("UPDATE t SET synced = 1 WHERE id = 42")
        );
        assert_eq!(requests[0].str_arg("event_source"), Some("accounts"));
    }

    #[tokio::test]
    async fn should_forward_db_args_verbatim_without_context() {
        let executor = executor();
        let action = db_action(json!({"command": "refresh", "args": ["$EVENT_TYPE"]}));

        action.execute(&executor).await.unwrap();

        assert_eq!(executor.db().requests()[0].args, action.args);
    }

    #[tokio::test]
    async fn should_isolate_db_args_between_runs() {
        let base = executor();
        let action = db_action(json!({"query": "SELECT '$EVENT_TYPE'"}));
        let configured = action.clone();

        action
            .execute(&base.with_context(context("pull.start", "", json!(null))))
            .await
            .unwrap();
        action
            .execute(&base.with_context(context("push.start", "", json!(null))))
            .await
            .unwrap();

        assert_eq!(action, configured);
        let queries: Vec<_> = base
            .db()
            .requests()
            .iter()
            .map(|r| r.str_arg("query").unwrap_or_default().to_string())
            .collect();
        assert_eq!(queries, ["SELECT 'pull.start'", "SELECT 'push.start'"]);
    }

    #[tokio::test]
    async fn should_propagate_database_errors_unchanged() {
        let executor = Executor::new(
            RecordingDatabase::failing("no such function: refresh"),
            RecordingApi::default(),
        );
        let err = db_action(json!({"function": "refresh"}))
            .execute(&executor)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no such function: refresh");
    }

    #[tokio::test]
    async fn should_send_templated_api_call() {
        let executor = executor().with_context(context(
            "pull.complete",
            "routes",
            json!({"id": 7}),
        ));
        let action = ApiAction::new("PATCH", "/routes/$EVENT_PAYLOAD[id]/")
            .with_data("status", "synced from $EVENT_SOURCE");

        action.execute(&executor).await.unwrap();

        let calls = executor.api().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "PATCH");
        assert_eq!(calls[0].endpoint, "/routes/7/");
        assert_eq!(calls[0].data["status"], "synced from routes");
    }

    #[tokio::test]
    async fn should_propagate_api_errors_unchanged() {
        let executor = Executor::new(
            RecordingDatabase::default(),
            RecordingApi::failing("unexpected status 404"),
        );
        let err = ApiAction::new("GET", "/missing/")
            .execute(&executor)
            .await
            .unwrap_err();
        assert!(matches!(err, BadgerError::Api(_)));
        assert_eq!(err.to_string(), "unexpected status 404");
    }

    #[tokio::test]
    async fn should_dispatch_through_action_sum_type() {
        let executor = executor();
        let config = ActionConfig::from_shorthand("api:/profiles/").unwrap();
        let action = Action::from_config(&config).unwrap();

        action.execute(&executor).await.unwrap();

        assert_eq!(executor.api().calls()[0].endpoint, "/profiles/");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_run_shell_command_with_event_tokens() {
        let dir = std::env::temp_dir().join(format!("badger-exec-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let out = dir.join("shell.txt");
        let executor = executor().with_context(context("pull.complete", "accounts", json!(null)));
        let action = ExecAction::shell(format!("echo $EVENT_TYPE > {}", out.display()));

        action.execute(&executor).await.unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("pull.complete"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_substitute_direct_argv_without_shell() {
        let action = ExecAction::direct("test", ["$EVENT_TYPE", "=", "pull.complete"]);

        let matching = executor().with_context(context("pull.complete", "", json!(null)));
        assert!(action.execute(&matching).await.is_ok());

        let other = executor().with_context(context("push.start", "", json!(null)));
        let err = action.execute(&other).await.unwrap_err();
        assert!(matches!(err, BadgerError::Execution(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_echo_substituted_direct_argv() {
        let executor = executor().with_context(context("pull.complete", "accounts", json!({"id": 9})));
        let action = ExecAction::direct("/bin/echo", ["$EVENT_TYPE", "$EVENT_PAYLOAD[id]", "$EVENT_SOURCE"]);

        let invocation = action.invocation(executor.context(), executor.platform());
        assert_eq!(invocation.program, "/bin/echo");
        let output = process::run(&invocation).await.unwrap();

        assert_eq!(output, "pull.complete 9 accounts");
        action.execute(&executor).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_expose_event_environment_to_commands() {
        let executor = executor().with_context(context("push.complete", "checkins", json!({"n": 1})));
        let action = ExecAction::shell(
            r#"test "$BADGER_EVENT_SOURCE" = checkins && test "$BADGER_EVENT_PAYLOAD_JSON" = '{"n":1}'"#,
        );

        assert!(action.execute(&executor).await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn should_report_failing_command_output() {
        let executor = executor();
        let err = ExecAction::shell("echo 'disk full' >&2; exit 2")
            .execute(&executor)
            .await
            .unwrap_err();

        assert!(matches!(err, BadgerError::Execution(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
