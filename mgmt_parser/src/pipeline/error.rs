use crate::logging::{codes, Code};
use crate::request::RequestError;
use crate::syntax::ParseError;

/// Pipeline processing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Request building failed: {0}")]
    Request(#[from] RequestError),
}

impl PipelineError {
    /// Offset in the line, when the failure points at one
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Parse(err) => Some(err.index()),
            Self::Request(_) => None,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Parse(err) => err.error_code(),
            Self::Request(err) => err.error_code(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}
