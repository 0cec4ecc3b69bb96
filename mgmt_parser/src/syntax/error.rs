//! Errors raised while tokenizing a line or folding its events
use crate::address::AddressError;
use crate::logging::{codes, Code};
use crate::rollout::RolloutError;
use crate::utils::Span;
use std::fmt;

pub type ParseResult<T> = Result<T, ParseError>;

/// Compile-time limits a line can run into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    LineLength,
    TokenLength,
    NestingDepth,
    AddressDepth,
    Arguments,
    ValueLength,
    Headers,
}

impl Limit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LineLength => "line length",
            Self::TokenLength => "token length",
            Self::NestingDepth => "nesting depth",
            Self::AddressDepth => "address depth",
            Self::Arguments => "arguments",
            Self::ValueLength => "value length",
            Self::Headers => "headers",
        }
    }

    pub const fn error_code(self) -> Code {
        match self {
            Self::LineLength => codes::lexical::LINE_TOO_LONG,
            Self::TokenLength | Self::ValueLength => codes::lexical::TOKEN_TOO_LONG,
            Self::NestingDepth => codes::lexical::NESTING_TOO_DEEP,
            Self::AddressDepth => codes::address::ADDRESS_TOO_DEEP,
            Self::Arguments | Self::Headers => codes::syntax::LIMIT_EXCEEDED,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed token '{token}' at {index}")]
    MalformedToken { token: String, index: usize },

    #[error("Malformed address at {index}: {message}")]
    MalformedAddress { message: String, index: usize },

    #[error("Maximum {limit} of {max} exceeded at {index}")]
    LimitExceeded {
        limit: Limit,
        max: usize,
        index: usize,
    },

    #[error("Unexpected {event} at {index}")]
    UnexpectedEvent { event: &'static str, index: usize },

    #[error("{source} (rollout header at {index})")]
    Rollout { source: RolloutError, index: usize },
}

impl ParseError {
    pub fn malformed_token(token: impl Into<String>, index: usize) -> Self {
        Self::MalformedToken {
            token: token.into(),
            index,
        }
    }

    pub fn malformed_address(message: impl Into<String>, index: usize) -> Self {
        Self::MalformedAddress {
            message: message.into(),
            index,
        }
    }

    pub fn limit(limit: Limit, max: usize, index: usize) -> Self {
        Self::LimitExceeded { limit, max, index }
    }

    /// Attach a line offset to an address navigation failure
    pub fn from_address(err: AddressError, index: usize) -> Self {
        match err {
            AddressError::MalformedAddress { message } => Self::MalformedAddress { message, index },
            AddressError::TooDeep { max } => Self::LimitExceeded {
                limit: Limit::AddressDepth,
                max,
                index,
            },
        }
    }

    /// Byte offset in the line the error points at
    pub fn index(&self) -> usize {
        match self {
            Self::MalformedToken { index, .. }
            | Self::MalformedAddress { index, .. }
            | Self::LimitExceeded { index, .. }
            | Self::UnexpectedEvent { index, .. }
            | Self::Rollout { index, .. } => *index,
        }
    }

    /// Span of the offending token, for caret diagnostics
    pub fn span(&self) -> Span {
        match self {
            Self::MalformedToken { token, index } if !token.is_empty() => {
                Span::at(*index, token.len())
            }
            Self::Rollout {
                source: RolloutError::MalformedPlan { index, .. },
                ..
            } => Span::single(*index),
            _ => Span::single(self.index()),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedToken { .. } => codes::lexical::MALFORMED_TOKEN,
            Self::MalformedAddress { .. } => codes::address::MALFORMED_ADDRESS,
            Self::LimitExceeded { limit, .. } => limit.error_code(),
            Self::UnexpectedEvent { .. } => codes::syntax::UNEXPECTED_EVENT,
            Self::Rollout { source, .. } => source.error_code(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
