//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes used by the line parser, their metadata,
//! and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Address navigation error codes
pub mod address {
    use super::Code;

    pub const MALFORMED_ADDRESS: Code = Code::new("E010");
    pub const ADDRESS_TOO_DEEP: Code = Code::new("E011");
}

/// Tokenizer error codes
pub mod lexical {
    use super::Code;

    pub const MALFORMED_TOKEN: Code = Code::new("E020");
    pub const LINE_TOO_LONG: Code = Code::new("E021");
    pub const TOKEN_TOO_LONG: Code = Code::new("E022");
    pub const NESTING_TOO_DEEP: Code = Code::new("E023");
}

/// Parse-state accumulator error codes
pub mod syntax {
    use super::Code;

    pub const LIMIT_EXCEEDED: Code = Code::new("E042");
    pub const UNEXPECTED_EVENT: Code = Code::new("E043");
}

/// Rollout plan error codes
pub mod rollout {
    use super::Code;

    pub const NO_PRECEDING_GROUP: Code = Code::new("E060");
    pub const INVALID_PROPERTY: Code = Code::new("E061");
    pub const EXCLUSIVE_FIELD_CONFLICT: Code = Code::new("E062");
    pub const UNKNOWN_ROLLOUT_PLAN: Code = Code::new("E063");
    pub const MALFORMED_PLAN: Code = Code::new("E064");
}

/// Request building error codes
pub mod request {
    use super::Code;

    pub const MISSING_OPERATION_NAME: Code = Code::new("E080");
    pub const MISSING_NODE_NAME: Code = Code::new("E081");
    pub const MISSING_ARGUMENT_VALUE: Code = Code::new("E082");
    pub const MISSING_HEADER_VALUE: Code = Code::new("E083");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_STATE_COMPLETE: Code = Code::new("I040");
    pub const ROLLOUT_PLAN_PARSED: Code = Code::new("I060");
    pub const REQUEST_BUILT: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const CATALOGUE: &[ErrorMetadata] = &[
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        "Internal parser error",
        "Report the input line that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        "Logging or configuration failed to initialize",
        "Check the MGMT_* environment variables",
    ),
    ErrorMetadata::new(
        "E010",
        "Address",
        Severity::Medium,
        true,
        "Address segment is structurally invalid",
        "Give every node as type=name and name only after a type",
    ),
    ErrorMetadata::new(
        "E011",
        "Address",
        Severity::Low,
        true,
        "Address is deeper than the configured maximum",
        "Use a shorter address or a prefix",
    ),
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        true,
        "Token does not match the identifier grammar",
        "Start names with a letter or underscore",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::Low,
        true,
        "Line exceeds the configured maximum length",
        "Split the request or raise the profile limit",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Low,
        true,
        "Token exceeds the configured maximum length",
        "Shorten the token",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Low,
        true,
        "Brackets are nested too deeply",
        "Flatten the value",
    ),
    ErrorMetadata::new(
        "E042",
        "Syntax",
        Severity::Low,
        true,
        "A configured limit was exceeded",
        "Reduce the number of items in the line",
    ),
    ErrorMetadata::new(
        "E043",
        "Syntax",
        Severity::High,
        true,
        "Event arrived in a state that cannot accept it",
        "Check the ordering of separators",
    ),
    ErrorMetadata::new(
        "E060",
        "Rollout",
        Severity::Medium,
        true,
        "Concurrent group given with no preceding group",
        "Name a group before using '^'",
    ),
    ErrorMetadata::new(
        "E061",
        "Rollout",
        Severity::Medium,
        true,
        "Rollout property has a blank name or value",
        "Give properties as name=value",
    ),
    ErrorMetadata::new(
        "E062",
        "Rollout",
        Severity::Medium,
        true,
        "Plan reference and group list used together",
        "Use either id=<plan> or a group list",
    ),
    ErrorMetadata::new(
        "E063",
        "Rollout",
        Severity::Medium,
        true,
        "Referenced rollout plan is not stored",
        "Store the plan before referencing it",
    ),
    ErrorMetadata::new(
        "E064",
        "Rollout",
        Severity::Medium,
        true,
        "Rollout clause does not follow the plan grammar",
        "Use group(prop=value),group^group",
    ),
    ErrorMetadata::new(
        "E080",
        "Request",
        Severity::Medium,
        true,
        "No operation name was given",
        "Add ':operation' after the address",
    ),
    ErrorMetadata::new(
        "E081",
        "Request",
        Severity::Medium,
        true,
        "Address node has a type but no name",
        "Complete the node as type=name",
    ),
    ErrorMetadata::new(
        "E082",
        "Request",
        Severity::Medium,
        true,
        "Argument has no value",
        "Give the argument as name=value",
    ),
    ErrorMetadata::new(
        "E083",
        "Request",
        Severity::Medium,
        true,
        "Header has no value",
        "Give the header as name=value",
    ),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| CATALOGUE.iter().map(|meta| (meta.code, meta)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get complete metadata for an error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_constant_is_registered() {
        let codes = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            address::MALFORMED_ADDRESS,
            address::ADDRESS_TOO_DEEP,
            lexical::MALFORMED_TOKEN,
            lexical::LINE_TOO_LONG,
            lexical::TOKEN_TOO_LONG,
            lexical::NESTING_TOO_DEEP,
            syntax::LIMIT_EXCEEDED,
            syntax::UNEXPECTED_EVENT,
            rollout::NO_PRECEDING_GROUP,
            rollout::INVALID_PROPERTY,
            rollout::EXCLUSIVE_FIELD_CONFLICT,
            rollout::UNKNOWN_ROLLOUT_PLAN,
            rollout::MALFORMED_PLAN,
            request::MISSING_OPERATION_NAME,
            request::MISSING_NODE_NAME,
            request::MISSING_ARGUMENT_VALUE,
            request::MISSING_HEADER_VALUE,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "{} missing from catalogue",
                code
            );
        }
    }

    #[test]
    fn test_classification_defaults() {
        assert_eq!(get_severity("nope"), Severity::Medium);
        assert!(is_recoverable("nope"));
        assert_eq!(get_category("nope"), "Unknown");
        assert!(!is_recoverable(system::INTERNAL_ERROR.as_str()));
        assert_eq!(get_category(request::MISSING_NODE_NAME.as_str()), "Request");
    }
}
