//! What the accumulator accepts and checks

use crate::config::runtime::ParserPreferences;

/// Validation and feature switches for a [`super::ParseState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsePolicy {
    /// Reject node types, operation names and argument names that are not
    /// identifiers
    pub validate_identifiers: bool,
    /// Keep bare argument values as positional arguments instead of treating
    /// them as value-less named arguments
    pub positional_arguments: bool,
    /// Accept a trailing `> target`
    pub output_redirection: bool,
}

impl ParsePolicy {
    /// Validating, operations only
    pub const fn operation() -> Self {
        Self {
            validate_identifiers: true,
            positional_arguments: false,
            output_redirection: false,
        }
    }

    /// Validating, with positional arguments and output redirection
    pub const fn command() -> Self {
        Self {
            validate_identifiers: true,
            positional_arguments: true,
            output_redirection: true,
        }
    }

    /// Accepts everything the tokenizer produces without checking names
    pub const fn raw() -> Self {
        Self {
            validate_identifiers: false,
            positional_arguments: true,
            output_redirection: true,
        }
    }

    pub fn from_preferences(preferences: &ParserPreferences) -> Self {
        Self {
            validate_identifiers: preferences.validate_identifiers,
            positional_arguments: preferences.positional_arguments,
            output_redirection: preferences.output_redirection,
        }
    }
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self::operation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(ParsePolicy::default(), ParsePolicy::operation());
        assert!(ParsePolicy::command().positional_arguments);
        assert!(!ParsePolicy::raw().validate_identifiers);
    }

    #[test]
    fn test_from_preferences() {
        let preferences = ParserPreferences {
            validate_identifiers: false,
            positional_arguments: true,
            output_redirection: false,
            coerce_values: true,
            allow_trailing_type: false,
        };
        let policy = ParsePolicy::from_preferences(&preferences);
        assert!(!policy.validate_identifiers);
        assert!(policy.positional_arguments);
        assert!(!policy.output_redirection);
    }
}
