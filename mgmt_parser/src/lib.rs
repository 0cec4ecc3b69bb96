//! Parser for management operation lines
//!
//! A line names a position in the resource tree, an operation to invoke there,
//! its arguments, and optional headers such as a rollout plan:
//!
//! ```text
//! /profile=full/subsystem=threads:write-core-threads(count=0,per-cpu=20){rollout groupA^groupB}
//! ```
//!
//! Lines are tokenized into index-tagged events ([`lexical`], [`tokens`]),
//! folded into a [`syntax::ParseState`] and, on demand, turned into an
//! [`request::OperationRequest`]. Incomplete lines are never errors: the state
//! records the separator the line ends on so a front-end can offer completions.

// Internal modules
pub mod address;
pub mod config;
pub mod grammar;
pub mod headers;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod request;
pub mod rollout;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use address::{AddressError, AddressPath, Node, NodePathFormatter};
pub use headers::OperationHeader;
pub use pipeline::{
    build_request, headers_value_from_str, parse_line, probe_line, process_line, PipelineError,
    PipelineResult, ProbeResult,
};
pub use request::{OperationRequest, RequestError, RequestOptions};
pub use rollout::{
    InMemoryPlanStore, RolloutError, RolloutPlanHeader, RolloutPlanStore, RolloutPosition,
    RolloutSeparator,
};
pub use syntax::{ParseError, ParsePolicy, ParseState};
pub use tokens::{EventKind, ParseEvent, SeparatorKind};
