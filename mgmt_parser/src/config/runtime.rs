// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Whether identifiers (node types, operation and argument names) are validated
    pub validate_identifiers: bool,

    /// Whether bare argument values are kept as positional arguments
    pub positional_arguments: bool,

    /// Whether a trailing `> target` is accepted
    pub output_redirection: bool,

    /// Whether argument values are coerced into typed values when building requests
    pub coerce_values: bool,

    /// Whether a trailing type-only node is accepted when building requests
    pub allow_trailing_type: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            validate_identifiers: env::var(env_vars::PARSER_VALIDATE_IDENTIFIERS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            positional_arguments: env::var(env_vars::PARSER_POSITIONAL_ARGUMENTS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            output_redirection: env::var(env_vars::PARSER_OUTPUT_REDIRECTION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            coerce_values: env::var(env_vars::PARSER_COERCE_VALUES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            allow_trailing_type: env::var(env_vars::PARSER_ALLOW_TRAILING_TYPE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to attach the parsed line to every event
    pub include_line_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_line_context: env::var(env_vars::LOGGING_INCLUDE_LINE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Parser
    pub const PARSER_VALIDATE_IDENTIFIERS: &str = "MGMT_PARSER_VALIDATE_IDENTIFIERS";
    pub const PARSER_POSITIONAL_ARGUMENTS: &str = "MGMT_PARSER_POSITIONAL_ARGUMENTS";
    pub const PARSER_OUTPUT_REDIRECTION: &str = "MGMT_PARSER_OUTPUT_REDIRECTION";
    pub const PARSER_COERCE_VALUES: &str = "MGMT_PARSER_COERCE_VALUES";
    pub const PARSER_ALLOW_TRAILING_TYPE: &str = "MGMT_PARSER_ALLOW_TRAILING_TYPE";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MGMT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MGMT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "MGMT_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_LINE_CONTEXT: &str = "MGMT_LOGGING_INCLUDE_LINE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_env_var_names_exist() {
        assert!(env_vars::PARSER_VALIDATE_IDENTIFIERS.starts_with("MGMT_"));
        assert!(env_vars::LOGGING_MIN_LEVEL.starts_with("MGMT_"));
    }
}
