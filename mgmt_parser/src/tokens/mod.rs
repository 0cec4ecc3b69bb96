//! Events passed from the tokenizer to the parse-state accumulator
//!
//! The tokenizer does not build any state of its own. It walks the line once
//! and emits a [`ParseEvent`] for every token and separator it finds, tagged
//! with the byte offset where it starts. The accumulator in
//! [`crate::syntax`] folds those events into a [`crate::syntax::ParseState`].
//!
//! Separator events drive completion: after the last event a front-end can
//! ask which [`SeparatorKind`] the line ends on.

pub mod event;

pub use event::{EventKind, ParseEvent, SeparatorKind};
