//! Dispatch: pick the first matching rule, build its command, launch it.

use std::sync::Arc;

use hopper_settings::SpawnSettings;
use tracing::{debug, info};

use crate::errors::Result;
use crate::expander::{expand_prefix, expand_references};
use crate::matcher::{RuleMatch, match_rule};
use crate::registry::RuleStoreHandle;
use crate::spawn::{CommandSpawner, LaunchContext, ShellSpawner};
use crate::store::RuleStore;
use crate::types::{RuleId, RuleKind};
use crate::variables::{EnvironmentExpander, VariableExpander};

/// Result of a dispatch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No rule applied to the input; nothing was launched.
    NoRuleMatched,
    /// A command was launched.
    Succeeded,
}

/// The command a rule produced for some input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Rule that matched.
    pub rule_id: RuleId,
    /// Its kind.
    pub kind: RuleKind,
    /// Fully expanded command line.
    pub command: String,
}

/// Matches input against a rule store and launches the result.
pub struct Dispatcher {
    spawner: Arc<dyn CommandSpawner>,
    variables: Arc<dyn VariableExpander>,
}

impl Dispatcher {
    /// Dispatcher over explicit collaborators.
    pub fn new(spawner: Arc<dyn CommandSpawner>, variables: Arc<dyn VariableExpander>) -> Self {
        Self { spawner, variables }
    }

    /// Dispatcher launching real processes, configured from settings.
    pub fn from_settings(settings: &SpawnSettings) -> Self {
        Self::new(
            Arc::new(ShellSpawner::from_settings(settings)),
            Arc::new(EnvironmentExpander),
        )
    }

    /// Find the command `text` maps to, without launching anything.
    ///
    /// Rules are tried in store order and the first match wins. A regex
    /// rule whose template cannot be expanded stops the search with an
    /// error.
    pub fn resolve(&self, store: &mut RuleStore, text: &str) -> Result<Option<ResolvedCommand>> {
        for rule in store.rules_mut() {
            let Some(matched) = match_rule(rule, text) else {
                continue;
            };
            let expanded = match matched {
                RuleMatch::Prefix => expand_prefix(rule.command(), rule.pattern(), text),
                RuleMatch::Regex(caps) => expand_references(rule.command(), &caps)?,
            };
            let command = self.variables.expand(&expanded);
            debug!(rule_id = %rule.id(), kind = %rule.kind(), %command, "rule matched");
            return Ok(Some(ResolvedCommand {
                rule_id: rule.id(),
                kind: rule.kind(),
                command,
            }));
        }
        debug!(text, "no rule matched");
        Ok(None)
    }

    /// Dispatch `text`: resolve it against the store and launch the command.
    ///
    /// The store lock is released before the process is spawned.
    pub fn execute(
        &self,
        store: &RuleStoreHandle,
        text: &str,
        context: &LaunchContext,
    ) -> Result<Outcome> {
        let resolved = self.resolve(&mut store.lock(), text)?;
        let Some(resolved) = resolved else {
            return Ok(Outcome::NoRuleMatched);
        };

        self.spawner.spawn(&resolved.command, context)?;
        info!(rule_id = %resolved.rule_id, command = %resolved.command, "launched");
        Ok(Outcome::Succeeded)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
