//! Glob-to-regex translation for filtering `git ls-tree` listings.
//!
//! This is deliberately not a full glob engine:
//!
//! - literal characters are regex-escaped;
//! - `?` matches any single character, including `/`;
//! - `*` matches any run of characters, including `/`;
//! - a doubled `**` collapses into one any-length wildcard, and a `/`
//!   directly after it is absorbed, so `src/**/*.ts` also matches
//!   `src/main.ts`;
//! - the pattern is anchored to the whole relative path.
//!
//! Because `*` already crosses separators, `src/*.ts` matches
//! `src/a/b.ts` here while the working-tree resolver would not match it.
//! Brace and bracket expressions are matched literally.

use regex::Regex;

/// Translates `pattern` into the regex source used for branch listings.
pub fn glob_to_regex_source(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');

    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                if c == '?' {
                    out.push('.');
                    continue;
                }
                let mut doubled = false;
                while chars.peek() == Some(&'*') {
                    chars.next();
                    doubled = true;
                }
                if doubled && chars.peek() == Some(&'/') {
                    chars.next();
                }
                out.push_str(".*");
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

/// Compiles `pattern` into an anchored regex.
///
/// # Errors
///
/// Returns an error if the translated regex fails to compile (for example
/// when it exceeds the regex size limit).
pub fn glob_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&glob_to_regex_source(pattern))
}
