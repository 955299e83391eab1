//! The live rule set and its persistence in a [`ConfigChannel`].
//!
//! A [`RuleStore`] keeps its rules in canonical order: every prefix rule
//! before every regex rule, and within a kind by descending pattern, so
//! that `!w` is tried before `!`. Equal patterns fall back to ascending id.
//!
//! Stores are normally obtained through [`crate::RuleStoreRegistry`], which
//! also subscribes them to channel changes.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use hopper_settings::{BlockedWatch, ConfigChannel, PropertyValue, WatchId};
use tracing::{debug, warn};

use crate::defaults::default_rules;
use crate::errors::{ActionsError, Result};
use crate::keys::{ACTIONS_KEY, RuleField, parse_rule_key, rule_key, rule_root};
use crate::matcher::compile_pattern;
use crate::types::{Rule, RuleId, RuleKind};

/// Ordered rule set backed by a configuration channel.
pub struct RuleStore {
    channel: Arc<dyn ConfigChannel>,
    watch_id: Option<WatchId>,
    rules: Vec<Rule>,
}

impl std::fmt::Debug for RuleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStore")
            .field("watch_id", &self.watch_id)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl RuleStore {
    /// Empty store over `channel`. Call [`load`](Self::load) to populate.
    pub fn new(channel: Arc<dyn ConfigChannel>) -> Self {
        Self {
            channel,
            watch_id: None,
            rules: Vec::new(),
        }
    }

    /// Replace the rule set with what the channel holds.
    ///
    /// Installs and persists the built-in rules when `/actions` is absent.
    /// Entries with a bad type, or a missing or empty pattern or command,
    /// are skipped.
    pub fn load(&mut self) {
        self.rules.clear();

        if !self.channel.has_property(ACTIONS_KEY) {
            self.rules = default_rules();
            self.sort();
            debug!(count = self.rules.len(), "no persisted rules, installing defaults");
            if let Err(error) = self.save(true) {
                warn!(%error, "failed to persist default rules");
            }
            return;
        }

        let Some(ids) = self.channel.get_int_array(ACTIONS_KEY) else {
            warn!(key = ACTIONS_KEY, "rule list is not an integer array, ignoring it");
            return;
        };

        let mut seen = HashSet::with_capacity(ids.len());
        for raw in ids {
            let id = RuleId::new(raw);
            if !seen.insert(id) {
                debug!(rule_id = %id, "skipping duplicate rule id");
                continue;
            }
            match self.read_rule(id) {
                Some(rule) => self.rules.push(rule),
                None => debug!(rule_id = %id, "skipping incomplete rule"),
            }
        }
        self.sort();
        debug!(count = self.rules.len(), "loaded rules");
    }

    fn read_rule(&self, id: RuleId) -> Option<Rule> {
        let kind = self
            .channel
            .get_int(&rule_key(id, RuleField::Type))
            .and_then(RuleKind::from_i32)?;
        let pattern = self
            .channel
            .get_string(&rule_key(id, RuleField::Pattern))
            .filter(|s| !s.is_empty())?;
        let command = self
            .channel
            .get_string(&rule_key(id, RuleField::Command))
            .filter(|s| !s.is_empty())?;
        Some(Rule::new(id, kind, pattern, command))
    }

    /// Write the id list, and every rule's fields when `persist_contents`.
    ///
    /// The store's own watch is blocked meanwhile so these writes are not
    /// fed back into [`apply_external_change`](Self::apply_external_change).
    pub fn save(&self, persist_contents: bool) -> Result<()> {
        let _blocked = self.block_own_watch();

        let ids = self.rules.iter().map(|r| r.id().get()).collect();
        self.channel.set_int_array(ACTIONS_KEY, ids)?;

        if persist_contents {
            for rule in &self.rules {
                let id = rule.id();
                self.channel
                    .set_int(&rule_key(id, RuleField::Type), rule.kind().as_i32())?;
                self.channel
                    .set_string(&rule_key(id, RuleField::Pattern), rule.pattern())?;
                self.channel
                    .set_string(&rule_key(id, RuleField::Command), rule.command())?;
            }
        }
        Ok(())
    }

    /// Fold a channel change for `/actions/action-<id>/<field>` into the
    /// live set.
    ///
    /// Returns whether a rule changed. Unknown ids, unknown fields, values
    /// of the wrong type, invalid kinds and empty strings are ignored;
    /// rules are never added or removed here.
    pub fn apply_external_change(&mut self, key: &str, value: &PropertyValue) -> bool {
        let Some((id, field)) = parse_rule_key(key) else {
            return false;
        };
        let Some(rule) = self.rules.iter_mut().find(|r| r.id() == id) else {
            return false;
        };

        let resort = match (field, value) {
            (RuleField::Type, PropertyValue::Int(raw)) => {
                let Some(kind) = RuleKind::from_i32(*raw) else {
                    debug!(rule_id = %id, kind = raw, "ignoring invalid rule kind");
                    return false;
                };
                if kind == rule.kind() {
                    return false;
                }
                rule.set_kind(kind);
                true
            }
            (RuleField::Pattern, PropertyValue::String(pattern)) if !pattern.is_empty() => {
                if pattern == rule.pattern() {
                    return false;
                }
                rule.set_pattern(pattern.clone());
                true
            }
            (RuleField::Command, PropertyValue::String(command)) if !command.is_empty() => {
                if command == rule.command() {
                    return false;
                }
                rule.set_command(command.clone());
                false
            }
            _ => {
                debug!(key, value_type = value.type_name(), "ignoring rule change");
                return false;
            }
        };

        debug!(rule_id = %id, field = field.as_str(), "rule updated from channel");
        if resort {
            self.sort();
        }
        true
    }

    /// Add a rule and persist it. Returns the new id (highest id + 1).
    pub fn add_rule(
        &mut self,
        kind: RuleKind,
        pattern: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<RuleId> {
        let pattern = pattern.into();
        let command = command.into();
        if pattern.is_empty() {
            return Err(ActionsError::InvalidRule("pattern is empty".into()));
        }
        if command.is_empty() {
            return Err(ActionsError::InvalidRule("command is empty".into()));
        }
        if kind == RuleKind::Regex {
            let _ = compile_pattern(&pattern)?;
        }

        let id = self.next_id();
        self.rules.push(Rule::new(id, kind, pattern, command));
        self.sort();
        if let Err(error) = self.save(true) {
            self.rules.retain(|r| r.id() != id);
            return Err(error);
        }
        debug!(rule_id = %id, %kind, "rule added");
        Ok(id)
    }

    /// Remove a rule, its channel keys, and its id from `/actions`.
    ///
    /// Returns `false` when no rule has `id`.
    pub fn remove_rule(&mut self, id: RuleId) -> Result<bool> {
        let Some(index) = self.rules.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let rule = self.rules.remove(index);

        let reset = {
            let _blocked = self.block_own_watch();
            self.channel.reset_property(&rule_root(id), true)
        };
        if let Err(error) = reset {
            self.rules.push(rule);
            self.sort();
            return Err(error.into());
        }
        // past this point the fields are gone, so a reload skips the id anyway
        self.save(false)?;
        debug!(rule_id = %id, "rule removed");
        Ok(true)
    }

    /// Rules in match order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rule with `id`.
    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn rules_mut(&mut self) -> impl Iterator<Item = &mut Rule> {
        self.rules.iter_mut()
    }

    /// Record the channel watch feeding this store; it is removed on drop.
    pub(crate) fn attach_watch(&mut self, id: WatchId) {
        if let Some(previous) = self.watch_id.replace(id) {
            self.channel.unwatch(previous);
        }
    }

    fn block_own_watch(&self) -> Option<BlockedWatch<'_>> {
        self.watch_id
            .map(|id| BlockedWatch::new(self.channel.as_ref(), id))
    }

    fn next_id(&self) -> RuleId {
        let max = self.rules.iter().map(|r| r.id().get()).max().unwrap_or(0);
        RuleId::new(max.saturating_add(1))
    }

    fn sort(&mut self) {
        sort_rules(&mut self.rules);
    }
}

impl Drop for RuleStore {
    fn drop(&mut self) {
        if let Some(id) = self.watch_id.take() {
            self.channel.unwatch(id);
            debug!("rule store released");
        }
    }
}

/// Sort into match order.
pub(crate) fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by(|a, b| {
        a.kind()
            .cmp(&b.kind())
            .then_with(|| Reverse(a.pattern().as_bytes()).cmp(&Reverse(b.pattern().as_bytes())))
            .then_with(|| a.id().cmp(&b.id()))
    });
}

/// Whether `rules` is in match order.
#[cfg(test)]
pub(crate) fn is_canonical(rules: &[Rule]) -> bool {
    rules.windows(2).all(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        (a.kind(), Reverse(a.pattern().as_bytes()), a.id())
            <= (b.kind(), Reverse(b.pattern().as_bytes()), b.id())
    })
}
