//! Identifier predicates
//!
//! Node types, operation names and argument names share one identifier
//! grammar: a letter or underscore followed by letters, digits, underscores or
//! hyphens. These are predicates only; callers turn `false` into a
//! `MalformedToken` carrying the token and its index.

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_part),
        _ => false,
    }
}

pub fn is_operation_name(token: &str) -> bool {
    is_identifier(token)
}

/// Argument names may carry a conventional `-` or `--` flag prefix.
pub fn is_argument_name(token: &str) -> bool {
    is_identifier(strip_flag_prefix(token))
}

/// Remove one leading `--` or `-` from a flag-style argument
pub fn strip_flag_prefix(token: &str) -> &str {
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token)
}

pub fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("subsystem"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("thread-pool2"));
        assert!(is_identifier("größe"));

        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("-abc"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_operation_names() {
        assert!(is_operation_name("read-resource"));
        assert!(is_operation_name("write-core-threads"));
        assert!(!is_operation_name("read:resource"));
    }

    #[test]
    fn test_argument_names_strip_flag_prefix() {
        assert!(is_argument_name("count"));
        assert!(is_argument_name("-recursive"));
        assert!(is_argument_name("--include-defaults"));
        assert!(!is_argument_name("---x"));
        assert!(!is_argument_name("--"));
        assert!(!is_argument_name("-1"));
    }

    #[test]
    fn test_strip_flag_prefix() {
        assert_eq!(strip_flag_prefix("--verbose"), "verbose");
        assert_eq!(strip_flag_prefix("-v"), "v");
        assert_eq!(strip_flag_prefix("plain"), "plain");
    }
}
