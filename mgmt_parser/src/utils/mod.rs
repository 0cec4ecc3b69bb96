//! Shared primitive types used by the tokenizer, the accumulator and diagnostics.

pub mod span;

pub use span::{format_error, Span};
