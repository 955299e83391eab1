//! Environment-style variable expansion for command lines.
//!
//! Supported forms:
//! - `$NAME` where `NAME` is `[A-Za-z_][A-Za-z0-9_]*`
//! - `${NAME}` with the same name rules
//! - `~` at the start of a word, followed by `/`, whitespace or the end,
//!   resolves to `$HOME`
//!
//! Unset variables expand to the empty string. A `$` that does not start a
//! valid name is kept as-is, and so is `~` when `HOME` is unset.

/// Expand variables in `input` against the process environment.
pub fn expand_variables(input: &str) -> String {
    expand_variables_with(input, |name| std::env::var(name).ok())
}

/// Expand variables in `input` using `lookup` to resolve names.
pub fn expand_variables_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut at_word_start = true;

    while let Some(c) = rest.chars().next() {
        let after = &rest[c.len_utf8()..];

        if c == '~' && at_word_start && ends_home_prefix(after) {
            match lookup("HOME") {
                Some(home) => out.push_str(&home),
                None => out.push('~'),
            }
            rest = after;
            at_word_start = false;
            continue;
        }

        if c == '$' {
            if let Some((name, consumed)) = variable_name(after) {
                if let Some(value) = lookup(name) {
                    out.push_str(&value);
                }
                rest = &after[consumed..];
                at_word_start = false;
                continue;
            }
        }

        out.push(c);
        at_word_start = c.is_whitespace();
        rest = after;
    }

    out
}

fn ends_home_prefix(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_none_or(|n| n == '/' || n.is_whitespace())
}

/// Parse a variable name at the start of `s`.
///
/// Returns the name and the number of bytes consumed (braces included).
fn variable_name(s: &str) -> Option<(&str, usize)> {
    if let Some(braced) = s.strip_prefix('{') {
        let end = braced.find('}')?;
        let name = &braced[..end];
        return is_identifier(name).then_some((name, end + 2));
    }

    let len = identifier_len(s);
    (len > 0).then(|| (&s[..len], len))
}

fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_len(name) == name.len()
}
