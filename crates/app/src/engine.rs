//! Event action engine: reacts to events by running the matching rules.
//!
//! For each dispatched event the engine builds one [`ExecutionContext`],
//! binds it to a copy of the base executor, and runs every matching rule.
//! Within a rule, steps run in declaration order and the first failing step
//! stops the rule. Rules are independent of each other.

use std::sync::Arc;

use badger_domain::action::{Action, ActionConfig};
use badger_domain::error::BadgerError;
use badger_domain::event::{Event, ExecutionContext};
use badger_domain::id::EventId;
use badger_domain::rule::EventAction;
use chrono::{DateTime, Utc};

use crate::execute::Execute;
use crate::executor::Executor;
use crate::ports::{ApiClient, DatabaseRunner};

/// Outcome of dispatching one event.
#[derive(Debug)]
pub struct DispatchReport {
    pub event_id: EventId,
    pub event_type: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per matching rule, in configuration order.
    pub rules: Vec<RuleOutcome>,
}

impl DispatchReport {
    /// `true` when every matching rule ran to completion.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.rules.iter().all(RuleOutcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules.iter().filter(|rule| !rule.is_success())
    }
}

/// What happened to one rule during a dispatch.
#[derive(Debug)]
pub struct RuleOutcome {
    pub rule: String,
    /// Number of steps that completed successfully.
    pub completed: usize,
    pub total: usize,
    pub failure: Option<StepFailure>,
}

impl RuleOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// The step that stopped a rule.
#[derive(Debug)]
pub struct StepFailure {
    /// Zero-based position of the step in the rule.
    pub step: usize,
    /// Configured action type of the step.
    pub kind: String,
    pub error: BadgerError,
}

/// Runs event actions against a base [`Executor`].
pub struct EventActionEngine<D, A> {
    rules: Vec<EventAction>,
    executor: Executor<D, A>,
}

impl<D, A> EventActionEngine<D, A>
where
    D: DatabaseRunner + Send + Sync,
    A: ApiClient + Send + Sync,
{
    /// Create a new engine.
    pub fn new(rules: Vec<EventAction>, executor: Executor<D, A>) -> Self {
        Self { rules, executor }
    }

    #[must_use]
    pub fn rules(&self) -> &[EventAction] {
        &self.rules
    }

    #[must_use]
    pub fn executor(&self) -> &Executor<D, A> {
        &self.executor
    }

    /// Rules triggered by an event of `event_type` from `source`.
    pub fn matching<'a>(
        &'a self,
        event_type: &'a str,
        source: &'a str,
    ) -> impl Iterator<Item = &'a EventAction> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.matches(event_type, source))
    }

    /// Run every rule matching `event`.
    #[tracing::instrument(
        skip(self, event),
        fields(event_id = %event.id, event_type = %event.event_type, source = %event.source)
    )]
    pub async fn dispatch(&self, event: &Event) -> DispatchReport {
        let started_at = Utc::now();
        let executor = self.executor.with_context(Arc::new(event.context()));

        let mut rules = Vec::new();
        for rule in self.matching(&event.event_type, &event.source) {
            rules.push(self.run_rule(rule, &executor).await);
        }
        if rules.is_empty() {
            tracing::debug!("no event action matches");
        }

        DispatchReport {
            event_id: event.id,
            event_type: event.event_type.clone(),
            source: event.source.clone(),
            started_at,
            finished_at: Utc::now(),
            rules,
        }
    }

    /// Build, validate and run one step outside of any rule.
    ///
    /// # Errors
    ///
    /// Returns the factory, validation or execution error of the step.
    #[tracing::instrument(skip(self, config, context), fields(kind = %config.kind))]
    pub async fn run_action(
        &self,
        config: &ActionConfig,
        context: Option<Arc<ExecutionContext>>,
    ) -> Result<(), BadgerError> {
        let executor = match context {
            Some(context) => self.executor.with_context(context),
            None => self.executor.clone(),
        };
        run_step(config, &executor).await
    }

    async fn run_rule(&self, rule: &EventAction, executor: &Executor<D, A>) -> RuleOutcome {
        let total = rule.run.len();
        for (step, config) in rule.run.iter().enumerate() {
            if let Err(error) = run_step(config, executor).await {
                tracing::warn!(rule = %rule.name, step, kind = %config.kind, %error, "event action step failed");
                return RuleOutcome {
                    rule: rule.name.clone(),
                    completed: step,
                    total,
                    failure: Some(StepFailure {
                        step,
                        kind: config.kind.clone(),
                        error,
                    }),
                };
            }
        }
        tracing::info!(rule = %rule.name, steps = total, "event action completed");
        RuleOutcome {
            rule: rule.name.clone(),
            completed: total,
            total,
            failure: None,
        }
    }
}

async fn run_step<D, A>(config: &ActionConfig, executor: &Executor<D, A>) -> Result<(), BadgerError>
where
    D: DatabaseRunner + Send + Sync,
    A: ApiClient + Send + Sync,
{
    let action = Action::from_config(config)?;
    action.validate()?;
    tracing::debug!(%action, "executing action");
    action.execute(executor).await
}
