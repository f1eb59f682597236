//! Certificate name sanitization and glob matching.
//!
//! Callers reference certificates by free-form names: bare common names,
//! archive file names, versioned `name@hash` references, or glob patterns.
//! [`sanitize`] turns any of these into a store selection pattern and
//! [`glob_match`] applies such patterns to archive names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Error, Result};

/// Leading certificate name token, optionally followed by an 8-hex
/// content-modification tag (`name@deadbeef`).
static NAME_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9.\-_]+)(@([A-Fa-f0-9]{8}))?")
        .expect("name token regex is valid at compile time")
});

/// Normalize a free-form certificate reference into a selection pattern.
///
/// Strips a trailing `suffix` (archive extension) and any directory
/// components, then extracts the leading name token:
///
/// * token carries an `@hash` tag: returned unchanged, the caller wants one
///   exact version;
/// * input already ends with `*`: returned unchanged, it is a pattern;
/// * bare token: `*` is appended so the pattern selects every version of
///   that name;
/// * no token at all: the stripped input is returned unchanged rather than
///   failing, selection will simply match nothing.
pub fn sanitize(name: &str, suffix: &str) -> String {
    let stripped = name.strip_suffix(suffix).unwrap_or(name);
    let stripped = match stripped.rsplit_once('/') {
        Some((_, base)) => base,
        None => stripped,
    };

    let captures = match NAME_TOKEN_REGEX.captures(stripped) {
        Some(captures) => captures,
        None => return stripped.to_string(),
    };
    if captures.get(3).is_some() {
        return stripped.to_string();
    }
    if stripped.ends_with('*') {
        return stripped.to_string();
    }

    let mut pattern = captures[1].to_string();
    pattern.push('*');
    pattern
}

/// Compile an fnmatch-style glob (`*`, `?`, `[...]`) into an anchored regex.
///
/// Bracket classes pass through, so a malformed class such as `[z-a]` is
/// reported as a validation error against the offending pattern.
pub fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 4);
    translated.push('^');

    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            '[' => {
                let mut class = String::new();
                let mut negated = false;
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    negated = true;
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                    class.push(']');
                }
                for inner in chars.by_ref() {
                    if inner == ']' {
                        closed = true;
                        break;
                    }
                    class.push(inner);
                }
                if closed {
                    translated.push('[');
                    if negated {
                        translated.push('^');
                    }
                    translated.push_str(&class);
                    translated.push(']');
                } else {
                    // Unterminated class, the bracket and everything after it
                    // match literally.
                    translated.push_str(&regex::escape("["));
                    if negated {
                        translated.push('!');
                    }
                    translated.push_str(&regex::escape(&class));
                }
            }
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }

    translated.push('$');
    Regex::new(&translated)
        .map_err(|err| Error::validation_field(format!("invalid glob pattern: {}", err), pattern))
}

/// Test `name` against an fnmatch-style glob. Invalid patterns match nothing.
pub fn glob_match(name: &str, pattern: &str) -> bool {
    match glob_regex(pattern) {
        Ok(regex) => regex.is_match(name),
        Err(_) => false,
    }
}
