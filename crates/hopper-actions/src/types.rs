//! Rule data model.

use std::fmt;

use regex::Regex;

/// How a rule's pattern is interpreted.
///
/// Persisted as `0` (prefix) and `1` (regex). The derived ordering puts
/// prefix rules before regex rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// Literal prefix of the input.
    Prefix,
    /// Regular expression searched in the input.
    Regex,
}

impl RuleKind {
    /// Decode the persisted integer form.
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Prefix),
            1 => Some(Self::Regex),
            _ => None,
        }
    }

    /// Persisted integer form.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Prefix => 0,
            Self::Regex => 1,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Regex => write!(f, "regex"),
        }
    }
}

/// Stable rule identifier, unique within a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(i32);

impl RuleId {
    /// Wrap a raw id.
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Cached compilation result for regex rules.
#[derive(Debug, Clone)]
pub(crate) enum CompiledPattern {
    /// Not attempted since the pattern last changed.
    Pending,
    /// Compiled and ready.
    Ready(Regex),
    /// Compilation failed; stays dead until the pattern changes.
    Invalid,
}

/// One pattern/command pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) id: RuleId,
    pub(crate) kind: RuleKind,
    pub(crate) pattern: String,
    pub(crate) command: String,
    pub(crate) compiled: CompiledPattern,
}

impl Rule {
    /// Build a rule. Validation happens where rules enter a store.
    pub fn new(
        id: RuleId,
        kind: RuleKind,
        pattern: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            pattern: pattern.into(),
            command: command.into(),
            compiled: CompiledPattern::Pending,
        }
    }

    /// Identifier.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Pattern interpretation.
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Prefix literal or regex source.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Command template.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether a compiled regex is cached.
    pub fn is_compiled(&self) -> bool {
        matches!(self.compiled, CompiledPattern::Ready(_))
    }

    /// Whether the current pattern is known not to compile.
    pub fn is_invalid(&self) -> bool {
        matches!(self.compiled, CompiledPattern::Invalid)
    }

    pub(crate) fn set_kind(&mut self, kind: RuleKind) {
        self.kind = kind;
        self.compiled = CompiledPattern::Pending;
    }

    pub(crate) fn set_pattern(&mut self, pattern: String) {
        self.pattern = pattern;
        self.compiled = CompiledPattern::Pending;
    }

    pub(crate) fn set_command(&mut self, command: String) {
        self.command = command;
    }

    /// Same id, kind, pattern and command (ignores the compile cache).
    pub fn same_definition(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.pattern == other.pattern
            && self.command == other.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_i32() {
        for kind in [RuleKind::Prefix, RuleKind::Regex] {
            assert_eq!(RuleKind::from_i32(kind.as_i32()), Some(kind));
        }
        assert_eq!(RuleKind::from_i32(-1), None);
        assert_eq!(RuleKind::from_i32(2), None);
    }

    #[test]
    fn prefix_orders_before_regex() {
        assert!(RuleKind::Prefix < RuleKind::Regex);
    }

    #[test]
    fn kind_display() {
        assert_eq!(RuleKind::Prefix.to_string(), "prefix");
        assert_eq!(RuleKind::Regex.to_string(), "regex");
    }

    #[test]
    fn pattern_write_clears_cache() {
        let mut rule = Rule::new(RuleId::new(1), RuleKind::Regex, "a+", "echo \\0");
        rule.compiled = CompiledPattern::Ready(Regex::new("a+").unwrap());
        assert!(rule.is_compiled());

        rule.set_pattern("b+".into());
        assert!(!rule.is_compiled());
        assert!(!rule.is_invalid());
    }

    #[test]
    fn kind_write_clears_cache() {
        let mut rule = Rule::new(RuleId::new(1), RuleKind::Regex, "(", "x");
        rule.compiled = CompiledPattern::Invalid;
        rule.set_kind(RuleKind::Prefix);
        assert!(!rule.is_invalid());
    }

    #[test]
    fn command_write_keeps_cache() {
        let mut rule = Rule::new(RuleId::new(1), RuleKind::Regex, "a+", "x");
        rule.compiled = CompiledPattern::Ready(Regex::new("a+").unwrap());
        rule.set_command("y".into());
        assert!(rule.is_compiled());
        assert_eq!(rule.command(), "y");
    }

    #[test]
    fn same_definition_ignores_cache() {
        let a = Rule::new(RuleId::new(4), RuleKind::Prefix, "#", "man %s");
        let mut b = a.clone();
        b.compiled = CompiledPattern::Invalid;
        assert!(a.same_definition(&b));
        b.set_command("info %s".into());
        assert!(!a.same_definition(&b));
    }
}
