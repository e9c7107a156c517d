//! Event actions: "when event E (optionally from source S) occurs, run
//! these steps in order".

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionConfig};
use crate::error::{BadgerError, ValidationError};

/// A named automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
    pub name: String,
    /// Event type this rule reacts to.
    pub event: String,
    /// Restrict to events from this source. Empty or absent matches any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub run: Vec<ActionConfig>,
}

impl EventAction {
    /// Whether an event of `event_type` from `source` triggers this rule.
    #[must_use]
    pub fn matches(&self, event_type: &str, source: &str) -> bool {
        if self.event != event_type {
            return false;
        }
        match self.source.as_deref() {
            None | Some("") => true,
            Some(filter) => filter == source,
        }
    }

    /// Check rule invariants.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ValidationError::EmptyName`] when `name` is blank
    /// - [`ValidationError::EmptyEvent`] when `event` is blank
    /// - [`ValidationError::NoSteps`] when `run` is empty
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.event.trim().is_empty() {
            return Err(ValidationError::EmptyEvent(self.name.clone()));
        }
        if self.run.is_empty() {
            return Err(ValidationError::NoSteps(self.name.clone()));
        }
        Ok(())
    }

    /// Build and validate every step, without running anything.
    ///
    /// # Errors
    ///
    /// Returns the first factory or validation error.
    pub fn steps(&self) -> Result<Vec<Action>, BadgerError> {
        self.run
            .iter()
            .map(|config| {
                let action = Action::from_config(config)?;
                action.validate()?;
                Ok(action)
            })
            .collect()
    }
}
