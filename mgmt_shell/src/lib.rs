//! # Management shell
//!
//! Front-end over `mgmt_parser`: loads the shell configuration (default
//! prefix, parser overrides, stored rollout plans) and runs operation lines
//! through the parser one at a time or from a stream.

pub mod config;
pub mod session;

pub use config::{ShellConfig, ShellError};
pub use session::{diagnostic, LineMode, LineSummary, Session};
