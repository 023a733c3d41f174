//! String literal quoting and unquoting.
//!
//! A string is written bare unless it could be mistaken for another kind of
//! token, in which case it is wrapped in `"` with five escapes: `\\`, `\"`,
//! `\n`, `\r` and `\t`. Every other character, including non-ASCII text,
//! passes through verbatim.
//!
//! ## Examples
//!
//! ```rust
//! use toon_codec::literal::{needs_quoting, quote, unquote};
//!
//! assert!(!needs_quoting("Alice"));
//! assert!(needs_quoting("has, a comma"));
//!
//! let quoted = quote("line\nbreak");
//! assert_eq!(quoted, r#""line\nbreak""#);
//! assert_eq!(unquote(&quoted), "line\nbreak");
//! ```

use std::borrow::Cow;

/// Reports whether `s` must be quoted to survive a round trip.
///
/// A string needs quoting when it is empty, equals `true`, `false` or `null`,
/// contains a structural or whitespace character, starts with `-`, or parses
/// as a number.
///
/// # Examples
///
/// ```rust
/// use toon_codec::literal::needs_quoting;
///
/// assert!(needs_quoting(""));
/// assert!(needs_quoting("null"));
/// assert!(needs_quoting("-5"));
/// assert!(needs_quoting("3.14"));
/// assert!(needs_quoting("a:b"));
/// assert!(!needs_quoting("hello_world"));
/// ```
#[must_use]
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || matches!(s, "true" | "false" | "null")
        || s.starts_with('-')
        || s.contains(is_structural)
        || s.parse::<f64>().is_ok()
}

#[inline]
fn is_structural(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '\r' | ',' | ':' | '[' | ']' | '{' | '}' | '"'
    )
}

/// Wraps `s` in double quotes, escaping backslash, quote, newline, carriage
/// return and tab.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_quoted(&mut out, s);
    out
}

/// Appends the quoted form of `s` to `out`.
pub fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Appends `s` to `out`, quoted only if [`needs_quoting`] says so.
pub fn write_literal(out: &mut String, s: &str) {
    if needs_quoting(s) {
        write_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Reports whether `s` is delimited by a leading and a trailing `"`.
#[inline]
#[must_use]
pub fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Reverses [`quote`].
///
/// Only literals delimited by quotes are unescaped; anything else is returned
/// unchanged. Escape sequences other than the five produced by [`quote`] are
/// kept verbatim, backslash included.
///
/// # Examples
///
/// ```rust
/// use toon_codec::literal::unquote;
///
/// assert_eq!(unquote(r#""say \"hi\"""#), r#"say "hi""#);
/// assert_eq!(unquote("bare"), "bare");
/// assert_eq!(unquote(r#""é""#), r"é");
/// ```
#[must_use]
pub fn unquote(s: &str) -> Cow<'_, str> {
    if !is_quoted(s) {
        return Cow::Borrowed(s);
    }
    let inner = &s[1..s.len() - 1];
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_tokens() {
        for s in ["Alice", "alice@example.com", "WIDGET-001", "snake_case", "café"] {
            assert!(!needs_quoting(s), "{s:?} should stay bare");
        }
    }

    #[test]
    fn test_tokens_that_need_quotes() {
        for s in [
            "", "true", "false", "null", "with space", "tab\there", "a,b", "k:v", "[x]",
            "{x}", "say \"hi\"", "-dash", "42", "-1.5", "1e10", "inf", "NaN",
        ] {
            assert!(needs_quoting(s), "{s:?} should be quoted");
        }
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\\b"), r#""a\\b""#);
        assert_eq!(quote("a\"b"), r#""a\"b""#);
        assert_eq!(quote("a\r\n\tb"), r#""a\r\n\tb""#);
        assert_eq!(quote(""), r#""""#);
    }

    #[test]
    fn test_unquote_is_single_pass() {
        // `\\n` is an escaped backslash followed by `n`, not a newline
        assert_eq!(unquote(r#""\\n""#), "\\n");
        assert_eq!(unquote(r#""a\\\"b""#), "a\\\"b");
    }

    #[test]
    fn test_unquote_requires_both_delimiters() {
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"open"), "\"open");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn test_unquote_borrows_without_escapes() {
        assert!(matches!(unquote("\"plain text\""), Cow::Borrowed("plain text")));
        assert!(matches!(unquote("\"a\\tb\""), Cow::Owned(_)));
    }

    #[test]
    fn test_round_trip() {
        for s in ["", "x", "has, a comma", "\\", "\"", "\\\"", "ünïcödé ✓", "\t \n"] {
            assert_eq!(unquote(&quote(s)), s);
        }
    }

    #[test]
    fn test_write_literal() {
        let mut out = String::new();
        write_literal(&mut out, "bare");
        out.push(',');
        write_literal(&mut out, "not bare");
        assert_eq!(out, r#"bare,"not bare""#);
    }
}
