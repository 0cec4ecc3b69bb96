//! Grammar constants and identifier validation for the operation line

pub mod separators;
pub mod validator;

pub use validator::{is_argument_name, is_identifier, is_operation_name, strip_flag_prefix};
