//! Channel key layout for persisted rules.
//!
//! ```text
//! /actions                         int array of rule ids, in order
//! /actions/action-<id>/type        0 = prefix, 1 = regex
//! /actions/action-<id>/pattern     string
//! /actions/action-<id>/command     string
//! ```

use crate::types::RuleId;

/// Key holding the ordered id list.
pub const ACTIONS_KEY: &str = "/actions";

const RULE_PREFIX: &str = "/actions/action-";

/// A per-rule property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// `type`
    Type,
    /// `pattern`
    Pattern,
    /// `command`
    Command,
}

impl RuleField {
    /// Key segment for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Pattern => "pattern",
            Self::Command => "command",
        }
    }

    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "type" => Some(Self::Type),
            "pattern" => Some(Self::Pattern),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

/// `/actions/action-<id>`, the root of one rule's keys.
pub fn rule_root(id: RuleId) -> String {
    format!("{RULE_PREFIX}{id}")
}

/// `/actions/action-<id>/<field>`.
pub fn rule_key(id: RuleId, field: RuleField) -> String {
    format!("{RULE_PREFIX}{id}/{}", field.as_str())
}

/// Split a per-rule key into id and field.
///
/// Returns `None` for anything outside the layout above, including unknown
/// field names and non-numeric ids.
pub fn parse_rule_key(key: &str) -> Option<(RuleId, RuleField)> {
    let rest = key.strip_prefix(RULE_PREFIX)?;
    let (id, field) = rest.split_once('/')?;
    let id = id.parse::<i32>().ok()?;
    Some((RuleId::new(id), RuleField::parse(field)?))
}
