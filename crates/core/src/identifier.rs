// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier-safety checks for table/column names coming off the wire.
//!
//! Table and column names are never user-supplied at apply time — they come
//! from the producer — but they are also never trusted as SQL identifiers
//! without this check.

use regex::Regex;
use std::sync::OnceLock;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::expect_used)]
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex is valid")
    })
}

/// True if `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_safe_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

/// Double-quote an identifier for use as a SQL identifier, doubling any
/// internal quotes. Used for table truncation, the only code path where a
/// whitelisted table name reaches SQL as an identifier rather than a bound
/// parameter.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(is_safe_identifier("users"));
        assert!(is_safe_identifier("_hidden"));
        assert!(is_safe_identifier("order_items2"));
    }

    #[test]
    fn rejects_unsafe_names() {
        assert!(!is_safe_identifier("users; drop table x"));
        assert!(!is_safe_identifier("2fast"));
        assert!(!is_safe_identifier("has space"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("qu\"ote"));
    }

    #[test]
    fn quoting_doubles_internal_quotes() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("weird\"name"), "\"weird\"\"name\"");
    }
}
