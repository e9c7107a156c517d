//! `SQLite` implementation of [`DatabaseRunner`].

use std::collections::BTreeMap;

use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqlitePool;

use badger_app::ports::DatabaseRunner;
use badger_domain::action::DbRequest;
use badger_domain::error::BadgerError;

use crate::error::StorageError;

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Runs `db` requests against a `SQLite` pool.
///
/// `command` names a statement from the configured command table, `query`
/// is raw SQL; `command` wins when both are present. The nested `args`
/// sequence is bound positionally.
pub struct SqliteDatabaseRunner {
    pool: SqlitePool,
    commands: BTreeMap<String, String>,
}

impl SqliteDatabaseRunner {
    /// Create a new runner using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            commands: BTreeMap::new(),
        }
    }

    /// Set the named statements available to `command`.
    #[must_use]
    pub fn with_commands(mut self, commands: BTreeMap<String, String>) -> Self {
        self.commands = commands;
        self
    }

    fn resolve<'a>(&'a self, request: &'a DbRequest) -> Result<&'a str, StorageError> {
        let sql = if let Some(name) = request.str_arg("command") {
            self.commands
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| StorageError::UnknownCommand(name.to_string()))?
        } else if let Some(query) = request.str_arg("query") {
            query
        } else if request.args.contains_key("function") {
            return Err(StorageError::Unsupported("function"));
        } else if request.args.contains_key("procedure") {
            return Err(StorageError::Unsupported("procedure"));
        } else {
            return Err(StorageError::MissingOperation);
        };

        if sql.trim().is_empty() {
            return Err(StorageError::EmptyQuery);
        }
        Ok(sql)
    }
}

impl DatabaseRunner for SqliteDatabaseRunner {
    async fn run_action(&self, request: DbRequest) -> Result<(), BadgerError> {
        let sql = self.resolve(&request)?;

        let query = request
            .params()
            .iter()
            .fold(sqlx::query(sql), |query, value| bind_value(query, value));
        let result = query
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        tracing::debug!(rows = result.rows_affected(), "db action executed");
        Ok(())
    }
}

/// Bind one JSON parameter with its natural `SQLite` type. Nested maps and
/// sequences are bound as their JSON text.
fn bind_value<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(flag) => query.bind(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => query.bind(int),
            None => query.bind(number.as_f64()),
        },
        Value::String(text) => query.bind(text.clone()),
        nested => query.bind(nested.to_string()),
    }
}
