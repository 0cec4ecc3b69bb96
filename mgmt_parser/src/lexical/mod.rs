//! Line tokenization
//!
//! Splits an operation line into index-tagged [`crate::tokens::ParseEvent`]s.
//! The tokenizer keeps no state between lines and holds no address of its
//! own; resolving node types against names is left to the accumulator.

pub mod tokenizer;

pub use tokenizer::{tokenize, tokenize_header_block, tokenize_line, unquote};
