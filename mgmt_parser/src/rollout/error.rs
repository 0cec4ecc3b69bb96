//! Rollout plan usage errors

use crate::logging::{codes, Code};

pub type RolloutResult<T> = Result<T, RolloutError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RolloutError {
    #[error("No preceding group to run '{group}' concurrently with")]
    NoPrecedingGroup { group: String },

    #[error("Invalid rollout property '{name}={value}': name and value must not be blank")]
    InvalidProperty { name: String, value: String },

    #[error("Rollout plan cannot have both {existing} and {requested}")]
    ExclusiveFieldConflict {
        existing: &'static str,
        requested: &'static str,
    },

    #[error("Rollout plan '{plan_ref}' is not stored")]
    UnknownRolloutPlan { plan_ref: String },

    #[error("Malformed rollout plan at {index}: {message}")]
    MalformedPlan { message: String, index: usize },

    #[error("Rollout plan exceeds the maximum of {max} {what}")]
    LimitExceeded { what: &'static str, max: usize },
}

impl RolloutError {
    pub fn invalid_property(name: &str, value: &str) -> Self {
        Self::InvalidProperty {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn malformed(message: impl Into<String>, index: usize) -> Self {
        Self::MalformedPlan {
            message: message.into(),
            index,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::NoPrecedingGroup { .. } => codes::rollout::NO_PRECEDING_GROUP,
            Self::InvalidProperty { .. } => codes::rollout::INVALID_PROPERTY,
            Self::ExclusiveFieldConflict { .. } => codes::rollout::EXCLUSIVE_FIELD_CONFLICT,
            Self::UnknownRolloutPlan { .. } => codes::rollout::UNKNOWN_ROLLOUT_PLAN,
            Self::MalformedPlan { .. } => codes::rollout::MALFORMED_PLAN,
            Self::LimitExceeded { .. } => codes::syntax::LIMIT_EXCEEDED,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
