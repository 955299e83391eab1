//! Command template expansion.
//!
//! Prefix rules use `%` tokens, regex rules use backslash references into
//! the match. Both return the command line before environment variables
//! are resolved.

use std::str::CharIndices;

use regex::Captures;

use crate::errors::{ActionsError, Result};

/// Expand a prefix-rule template.
///
/// | token | becomes |
/// |---|---|
/// | `%s` | `text` after the prefix, leading whitespace trimmed |
/// | `%S` | all of `text` |
/// | `%%` | `%` |
/// | `%` + other | nothing |
/// | trailing `%` | `%` |
pub fn expand_prefix(template: &str, prefix: &str, text: &str) -> String {
    let suffix = text.get(prefix.len()..).unwrap_or_default().trim_start();
    let mut out = String::with_capacity(template.len() + text.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push_str(suffix),
            Some('S') => out.push_str(text),
            Some('%') | None => out.push('%'),
            Some(_) => {}
        }
    }
    out
}

/// Expand a regex-rule template against `caps`.
///
/// `\0`..`\9` and `\g<N>` / `\g<name>` insert groups (empty when the group
/// did not take part in the match), `\\` is a backslash, and `\n \t \r \f
/// \v \a \e` are control characters.
///
/// `\u` / `\l` upper- or lowercase the next character produced, `\U` / `\L`
/// everything up to `\E`. A new case escape replaces the current one.
/// Anything else after a backslash is an error.
pub fn expand_references(template: &str, caps: &Captures<'_>) -> Result<String> {
    let mut out = CaseWriter::with_capacity(template.len());
    let mut chars = template.char_indices();

    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(expansion_error(template, format!("stray final '\\' at position {pos}")));
        };
        match escape {
            '0'..='9' => {
                let index = escape as usize - '0' as usize;
                out.push_group(caps.get(index));
            }
            'g' => {
                let reference = group_reference(template, pos, &mut chars)?;
                let group = match reference.parse::<usize>() {
                    Ok(index) => caps.get(index),
                    Err(_) => caps.name(reference),
                };
                out.push_group(group);
            }
            'u' => out.case = CaseChange::UpperNext,
            'l' => out.case = CaseChange::LowerNext,
            'U' => out.case = CaseChange::Upper,
            'L' => out.case = CaseChange::Lower,
            'E' => out.case = CaseChange::None,
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'a' => out.push('\u{07}'),
            'e' => out.push('\u{1b}'),
            other => {
                return Err(expansion_error(
                    template,
                    format!("unknown escape sequence '\\{other}' at position {pos}"),
                ));
            }
        }
    }
    Ok(out.text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseChange {
    None,
    UpperNext,
    LowerNext,
    Upper,
    Lower,
}

/// Output buffer applying the active case conversion.
struct CaseWriter {
    text: String,
    case: CaseChange,
}

impl CaseWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            case: CaseChange::None,
        }
    }

    fn push(&mut self, c: char) {
        let mut buf = [0; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    fn push_group(&mut self, group: Option<regex::Match<'_>>) {
        if let Some(m) = group {
            self.push_str(m.as_str());
        }
    }

    // an empty piece leaves a pending single-character change in place
    fn push_str(&mut self, piece: &str) {
        match self.case {
            CaseChange::None => self.text.push_str(piece),
            CaseChange::Upper => self.text.push_str(&piece.to_uppercase()),
            CaseChange::Lower => self.text.push_str(&piece.to_lowercase()),
            CaseChange::UpperNext | CaseChange::LowerNext => {
                let mut chars = piece.chars();
                let Some(first) = chars.next() else {
                    return;
                };
                if self.case == CaseChange::UpperNext {
                    self.text.extend(first.to_uppercase());
                } else {
                    self.text.extend(first.to_lowercase());
                }
                self.text.push_str(chars.as_str());
                self.case = CaseChange::None;
            }
        }
    }
}

/// Read `<ref>` after `\g`, returning `ref`.
fn group_reference<'a>(
    template: &'a str,
    pos: usize,
    chars: &mut CharIndices<'a>,
) -> Result<&'a str> {
    let malformed = || expansion_error(template, format!("malformed group reference at position {pos}"));

    let Some((open, '<')) = chars.next() else {
        return Err(malformed());
    };
    let start = open + 1;
    loop {
        match chars.next() {
            Some((close, '>')) => {
                let reference = &template[start..close];
                let valid = !reference.is_empty()
                    && (reference.bytes().all(|b| b.is_ascii_digit())
                        || is_group_name(reference));
                return if valid { Ok(reference) } else { Err(malformed()) };
            }
            Some(_) => {}
            None => return Err(malformed()),
        }
    }
}

fn is_group_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn expansion_error(template: &str, reason: String) -> ActionsError {
    ActionsError::RegexExpansion {
        template: template.to_owned(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use regex::Regex;

    use super::*;

    fn expand(pattern: &str, text: &str, template: &str) -> Result<String> {
        let re = Regex::new(pattern).unwrap();
        let caps = re.captures(text).unwrap();
        expand_references(template, &caps)
    }

    // -- prefix --

    #[test]
    fn prefix_suffix_is_trimmed() {
        assert_eq!(
            expand_prefix("x-terminal-emulator -e %s", "!", "!  ls -la"),
            "x-terminal-emulator -e ls -la"
        );
    }

    #[test]
    fn prefix_full_text() {
        assert_eq!(expand_prefix("echo %S", "#", "#printf"), "echo #printf");
    }

    #[test]
    fn prefix_percent_tokens() {
        assert_eq!(expand_prefix("a%%b", "!", "!x"), "a%b");
        assert_eq!(expand_prefix("a%qb", "!", "!x"), "ab");
        assert_eq!(expand_prefix("100%", "!", "!x"), "100%");
    }

    #[test]
    fn prefix_without_tokens_is_unchanged() {
        assert_eq!(expand_prefix("xdg-open .", "!", "!anything"), "xdg-open .");
    }

    #[test]
    fn prefix_empty_suffix() {
        assert_eq!(expand_prefix("man %s", "#", "#"), "man ");
    }

    #[test]
    fn prefix_multibyte_suffix() {
        assert_eq!(expand_prefix("open %s", "→", "→ café"), "open café");
    }

    // -- regex --

    #[test]
    fn whole_match_and_groups() {
        let out = expand(r"^(file|http|https)://(.*)$", "http://example.com", r"\1 \2 \0");
        assert_eq!(out.unwrap(), "http example.com http://example.com");
    }

    #[test]
    fn unmatched_and_missing_groups_are_empty() {
        assert_eq!(expand(r"a(b)?", "a", r"[\1][\7]").unwrap(), "[][]");
    }

    #[test]
    fn g_references() {
        let out = expand(r"(?P<host>[a-z]+)\.(?P<tld>[a-z]+)", "example.org", r"\g<tld>/\g<1>");
        assert_eq!(out.unwrap(), "org/example");
    }

    #[test]
    fn multi_digit_g_reference() {
        let pattern = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        assert_eq!(expand(pattern, "abcdefghijk", r"\g<11>\10").unwrap(), "ka0");
    }

    #[test]
    fn escapes() {
        assert_eq!(expand("x", "x", r"a\\b\tc\nd").unwrap(), "a\\b\tc\nd");
        assert_eq!(expand("x", "x", r"\e\a\f\v\r").unwrap(), "\u{1b}\u{07}\u{0c}\u{0b}\r");
    }

    #[test]
    fn case_spans() {
        let out = expand(
            r"^https?://(.*)$",
            "https://Example.COM/Path",
            r"xdg-open https://x/\L\1\E",
        );
        assert_eq!(out.unwrap(), "xdg-open https://x/example.com/path");
        assert_eq!(expand("(ab)", "ab", r"\U\1-x\E-\1").unwrap(), "AB-X-ab");
        assert_eq!(expand("(AB)", "AB", r"\L\1\Uc").unwrap(), "abC");
    }

    #[test]
    fn case_single_character() {
        assert_eq!(expand("(foo) (BAR)", "foo BAR", r"\u\1 \l\2").unwrap(), "Foo bAR");
        assert_eq!(expand("(é)", "é", r"\u\1").unwrap(), "É");
    }

    #[test]
    fn case_single_waits_for_a_character() {
        assert_eq!(expand("a(b)?", "a", r"\l\1X").unwrap(), "x");
    }

    #[test]
    fn case_escape_replaces_previous() {
        assert_eq!(expand("(abc)", "abc", r"\U\u\1").unwrap(), "Abc");
        assert_eq!(expand("(abc)", "abc", r"\E\1").unwrap(), "abc");
    }

    #[test]
    fn trailing_backslash_fails() {
        assert_matches!(
            expand("x", "x", r"open \"),
            Err(ActionsError::RegexExpansion { ref reason, .. }) if reason.contains("stray final")
        );
    }

    #[test]
    fn unknown_escape_fails() {
        assert_matches!(
            expand("x", "x", r"open \q"),
            Err(ActionsError::RegexExpansion { ref template, ref reason })
                if template == r"open \q" && reason.contains(r"'\q'")
        );
    }

    #[test]
    fn malformed_g_fails() {
        for template in [r"\g", r"\g1", r"\g<", r"\g<1", r"\g<>", r"\g<a-b>", r"\g<1x>"] {
            assert_matches!(
                expand("x", "x", template),
                Err(ActionsError::RegexExpansion { .. }),
                "{template}"
            );
        }
    }

    #[test]
    fn unknown_group_name_is_empty() {
        assert_eq!(expand("(?P<a>x)", "x", r"[\g<b>]").unwrap(), "[]");
    }

    #[test]
    fn percent_is_literal_in_regex_templates() {
        assert_eq!(expand("x", "x", "100% %s").unwrap(), "100% %s");
    }
}
