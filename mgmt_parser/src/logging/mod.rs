//! Global logging module for the management line parser
//!
//! Provides thread-safe global logging with a per-thread line context and a
//! macro interface. Every macro is a no-op until a service is installed.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static LINE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::address::MALFORMED_ADDRESS,
        codes::lexical::MALFORMED_TOKEN,
        codes::request::MISSING_OPERATION_NAME,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// LINE CONTEXT MANAGEMENT
// ============================================================================

/// Execute function with the line being parsed attached to every event it logs
pub fn with_line_context<F, R>(line: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = LINE_CONTEXT.with(|ctx| ctx.replace(Some(line.to_string())));
    let result = f();
    LINE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

/// Get current line context (used by macros)
pub fn get_current_line_context() -> Option<String> {
    LINE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Attach line context and dispatch to the global logger, if any
pub fn dispatch(event: LogEvent) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    let event = match get_current_line_context() {
        Some(line) => event.with_line(&line),
        None => event,
    };
    logger.log_event(event);
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    dispatch(event);
}

/// Get system diagnostics
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();
    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    diagnostics.push_str(&format!(
        "Limits: {}\n",
        crate::config::build_info::source_info()
    ));
    diagnostics.push_str(&config::get_config_summary());
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_context_is_scoped() {
        assert!(get_current_line_context().is_none());

        let result = with_line_context("a=b:op", || {
            assert_eq!(get_current_line_context().as_deref(), Some("a=b:op"));
            with_line_context("inner", || {
                assert_eq!(get_current_line_context().as_deref(), Some("inner"));
            });
            assert_eq!(get_current_line_context().as_deref(), Some("a=b:op"));
            7
        });

        assert_eq!(result, 7);
        assert!(get_current_line_context().is_none());
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
