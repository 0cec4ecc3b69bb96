//! Reserved characters and pseudo-tokens of the operation line
//!
//! The line grammar is
//! `[type=name(/type=name)*] [':' op ['(' name=value (',' ...)* ')'] ['{' header (';' header)* '}'] ['>' target]]`.

/// Separates the address from the operation
pub const ADDRESS_OPERATION: char = ':';
/// Separates address nodes
pub const NODE: char = '/';
/// Separates a node type from its name
pub const NODE_TYPE_NAME: char = '=';
/// Separates an argument name from its value
pub const ARG_NAME_VALUE: char = '=';
/// Separates arguments
pub const ARG: char = ',';
pub const ARG_LIST_START: char = '(';
pub const ARG_LIST_END: char = ')';
pub const HEADER_LIST_START: char = '{';
pub const HEADER_LIST_END: char = '}';
/// Brackets of a list value
pub const LIST_START: char = '[';
pub const LIST_END: char = ']';
/// Separates headers inside a header block
pub const HEADER: char = ';';
/// Introduces an output redirection target
pub const OUTPUT_REDIRECT: char = '>';

pub const QUOTE: char = '"';
pub const ESCAPE: char = '\\';

/// Marks a path relative to the prefix
pub const RELATIVE_MARKER: &str = "./";
/// Navigates to the parent node
pub const PARENT_NODE: &str = "..";
/// Turns the current node back into a pending type
pub const NODE_TYPE_ONLY: &str = ".type";

/// Separates rollout groups executed in sequence
pub const ROLLOUT_SEQUENCE: char = ',';
/// Joins a rollout group to the preceding one for concurrent execution
pub const ROLLOUT_CONCURRENT: char = '^';
/// Header name that introduces a rollout plan
pub const ROLLOUT_HEADER: &str = "rollout";
/// Rollout clause that references a stored plan
pub const ROLLOUT_PLAN_ID: &str = "id";

/// Characters that must be escaped inside an unquoted node name
pub const NODE_NAME_RESERVED: &[char] = &[
    ADDRESS_OPERATION,
    NODE,
    NODE_TYPE_NAME,
    ARG,
    ARG_LIST_START,
    ARG_LIST_END,
    HEADER_LIST_START,
    HEADER_LIST_END,
    LIST_START,
    LIST_END,
    OUTPUT_REDIRECT,
    QUOTE,
    ESCAPE,
    ' ',
];

/// Open/close pairs that are opaque to every separator search
pub const BRACKETS: &[(char, char)] = &[
    (ARG_LIST_START, ARG_LIST_END),
    (LIST_START, LIST_END),
    (HEADER_LIST_START, HEADER_LIST_END),
];
