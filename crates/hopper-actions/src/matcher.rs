//! Matching input text against a single rule.
//!
//! Regex rules compile on first use and cache the result on the rule
//! itself. A pattern that fails to compile is logged once and then treated
//! as non-matching until its pattern or kind is rewritten.

use regex::{Captures, Regex};
use tracing::warn;

use crate::errors::{ActionsError, Result};
use crate::types::{CompiledPattern, Rule, RuleKind};

/// A successful match.
#[derive(Debug)]
pub enum RuleMatch<'t> {
    /// The input starts with the rule's prefix.
    Prefix,
    /// The rule's regex matched; groups are available for expansion.
    Regex(Captures<'t>),
}

/// Compile a regex rule pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ActionsError::RegexCompile {
        pattern: pattern.to_owned(),
        source,
    })
}

impl Rule {
    /// Compiled regex, compiling on first call.
    fn regex(&mut self) -> Option<&Regex> {
        if matches!(self.compiled, CompiledPattern::Pending) {
            self.compiled = match compile_pattern(&self.pattern) {
                Ok(regex) => CompiledPattern::Ready(regex),
                Err(error) => {
                    warn!(rule_id = %self.id, pattern = %self.pattern, %error, "rule pattern does not compile");
                    CompiledPattern::Invalid
                }
            };
        }
        match &self.compiled {
            CompiledPattern::Ready(regex) => Some(regex),
            CompiledPattern::Pending | CompiledPattern::Invalid => None,
        }
    }
}

/// Test `text` against `rule`.
pub fn match_rule<'t>(rule: &mut Rule, text: &'t str) -> Option<RuleMatch<'t>> {
    match rule.kind {
        RuleKind::Prefix => text.starts_with(rule.pattern.as_str()).then_some(RuleMatch::Prefix),
        RuleKind::Regex => rule.regex()?.captures(text).map(RuleMatch::Regex),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use hopper_core::logging::capture_logs;
    use tracing::Level;

    use super::*;
    use crate::types::RuleId;

    fn rule(kind: RuleKind, pattern: &str) -> Rule {
        Rule::new(RuleId::new(1), kind, pattern, "cmd")
    }

    #[test]
    fn prefix_is_byte_exact() {
        let mut r = rule(RuleKind::Prefix, "!w");
        assert_matches!(match_rule(&mut r, "!w rust"), Some(RuleMatch::Prefix));
        assert_matches!(match_rule(&mut r, "!W rust"), None);
        assert_matches!(match_rule(&mut r, " !w rust"), None);
        assert_matches!(match_rule(&mut r, "!"), None);
    }

    #[test]
    fn prefix_never_compiles() {
        let mut r = rule(RuleKind::Prefix, "(");
        assert_matches!(match_rule(&mut r, "(x"), Some(RuleMatch::Prefix));
        assert!(!r.is_compiled());
        assert!(!r.is_invalid());
    }

    #[test]
    fn regex_exposes_groups() {
        let mut r = rule(RuleKind::Regex, r"^(file|http|https)://(.*)$");
        let Some(RuleMatch::Regex(caps)) = match_rule(&mut r, "https://example.com") else {
            panic!("expected regex match");
        };
        assert_eq!(&caps[0], "https://example.com");
        assert_eq!(&caps[1], "https");
        assert_eq!(&caps[2], "example.com");
        assert!(r.is_compiled());
    }

    #[test]
    fn regex_searches_anywhere() {
        let mut r = rule(RuleKind::Regex, r"\d+");
        let Some(RuleMatch::Regex(caps)) = match_rule(&mut r, "abc 42 def") else {
            panic!("expected regex match");
        };
        assert_eq!(&caps[0], "42");
    }

    #[test]
    fn regex_miss() {
        let mut r = rule(RuleKind::Regex, "^x$");
        assert_matches!(match_rule(&mut r, "y"), None);
        assert!(r.is_compiled());
    }

    #[test]
    fn bad_pattern_warns_once() {
        let (logs, _guard) = capture_logs();
        let mut r = rule(RuleKind::Regex, "(unclosed");

        for _ in 0..3 {
            assert_matches!(match_rule(&mut r, "(unclosed"), None);
        }
        assert!(r.is_invalid());
        assert_eq!(logs.count_matching(Level::WARN, "does not compile"), 1);
    }

    #[test]
    fn bad_pattern_recovers_after_rewrite() {
        let (logs, _guard) = capture_logs();
        let mut r = rule(RuleKind::Regex, "(");
        assert_matches!(match_rule(&mut r, "a"), None);

        r.set_pattern("a".into());
        assert_matches!(match_rule(&mut r, "a"), Some(RuleMatch::Regex(_)));

        r.set_pattern("[".into());
        assert_matches!(match_rule(&mut r, "["), None);
        assert_eq!(logs.count_matching(Level::WARN, "does not compile"), 2);
    }

    #[test]
    fn compile_pattern_reports_pattern() {
        let err = compile_pattern("[").unwrap_err();
        assert_matches!(err, ActionsError::RegexCompile { ref pattern, .. } if pattern == "[");
    }
}
