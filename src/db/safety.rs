//! Pre-execution safety filter for ad-hoc queries.
//!
//! A case-insensitive substring check against a fixed keyword denylist.
//! This is intentionally not a SQL parser: a keyword appearing anywhere in
//! the text, including inside string literals, comments, or identifiers,
//! rejects the query. False positives (a column named `update_ts`) are the
//! accepted cost; obfuscated or engine-specific mutating constructs can
//! still slip through, so this is defense-in-depth on top of a read-only
//! connection, not a security boundary.

/// Keywords denied for every engine.
pub const UNSAFE_KEYWORDS: &[&str] = &[
    "DELETE", "INSERT", "UPDATE", "DROP", "CREATE", "ALTER", "EXEC", "EXECUTE",
];

/// Check whether a raw query contains any denylisted keyword.
///
/// `extra` holds engine-specific additions (the Postgres dialect denies
/// `CALL` and `TRUNCATE` on top of the core set). Pure function, no I/O.
pub fn is_unsafe_query(query: &str, extra: &[&str]) -> bool {
    let upper = query.to_uppercase();
    UNSAFE_KEYWORDS
        .iter()
        .chain(extra.iter())
        .any(|keyword| upper.contains(keyword))
}

/// The first denylisted keyword found in the query, for error messages.
pub fn first_unsafe_keyword(query: &str, extra: &[&str]) -> Option<String> {
    let upper = query.to_uppercase();
    UNSAFE_KEYWORDS
        .iter()
        .copied()
        .chain(extra.iter().copied())
        .find(|keyword| upper.contains(keyword))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select_is_safe() {
        assert!(!is_unsafe_query("SELECT * FROM orders", &[]));
        assert!(!is_unsafe_query("SELECT id, name FROM customers WHERE id = 1", &[]));
    }

    #[test]
    fn test_each_core_keyword_rejected() {
        for keyword in UNSAFE_KEYWORDS {
            let query = format!("{} something", keyword);
            assert!(is_unsafe_query(&query, &[]), "expected rejection of {}", keyword);
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_unsafe_query("dElEtE FROM orders", &[]));
        assert!(is_unsafe_query("select 1; Drop table x", &[]));
        assert!(is_unsafe_query("inSERT into t values (1)", &[]));
    }

    #[test]
    fn test_keyword_inside_string_literal_rejected() {
        // Syntax-unaware by design: literals are not exempt.
        assert!(is_unsafe_query(
            "SELECT * FROM logs WHERE message = 'DROP TABLE users'",
            &[]
        ));
    }

    #[test]
    fn test_keyword_inside_identifier_rejected() {
        // Documented false positive: substring match, not word-boundary.
        assert!(is_unsafe_query("SELECT update_ts FROM orders", &[]));
        assert!(is_unsafe_query("SELECT created_at FROM orders", &[]));
    }

    #[test]
    fn test_extra_keywords_only_apply_when_given() {
        assert!(!is_unsafe_query("SELECT * FROM call_log", &[]));
        assert!(is_unsafe_query("SELECT * FROM call_log", &["CALL", "TRUNCATE"]));
        assert!(is_unsafe_query("TRUNCATE orders", &["CALL", "TRUNCATE"]));
    }

    #[test]
    fn test_empty_query_is_safe_here() {
        // Emptiness is a validation concern, not a safety one.
        assert!(!is_unsafe_query("", &[]));
    }

    #[test]
    fn test_first_unsafe_keyword_names_the_match() {
        assert_eq!(
            first_unsafe_keyword("DELETE FROM orders", &[]).as_deref(),
            Some("DELETE")
        );
        assert_eq!(first_unsafe_keyword("SELECT 1", &[]), None);
    }
}
