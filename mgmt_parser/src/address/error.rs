//! Address navigation errors

use crate::logging::{codes, Code};

pub type AddressResult<T> = Result<T, AddressError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Malformed address: {message}")]
    MalformedAddress { message: String },

    #[error("Address exceeds the maximum depth of {max} nodes")]
    TooDeep { max: usize },
}

impl AddressError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedAddress {
            message: message.into(),
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::MalformedAddress { .. } => codes::address::MALFORMED_ADDRESS,
            Self::TooDeep { .. } => codes::address::ADDRESS_TOO_DEEP,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
