//! Rules installed when the channel has no `/actions` key yet.

use crate::types::{Rule, RuleId, RuleKind};

/// Built-in rule definitions, in id order starting at 1.
pub const DEFAULT_RULES: &[(RuleKind, &str, &str)] = &[
    (
        RuleKind::Regex,
        r"^(file|http|https)://(.*)$",
        r"xdg-open \0",
    ),
    (RuleKind::Prefix, "!", "x-terminal-emulator -e %s"),
    (
        RuleKind::Prefix,
        "!w",
        "xdg-open https://en.wikipedia.org/wiki/%s",
    ),
    (RuleKind::Prefix, "#", "x-terminal-emulator -e man %s"),
];

/// Fresh copies of the built-in rules, unsorted.
pub fn default_rules() -> Vec<Rule> {
    DEFAULT_RULES
        .iter()
        .zip(1..)
        .map(|(&(kind, pattern, command), id)| Rule::new(RuleId::new(id), kind, pattern, command))
        .collect()
}
