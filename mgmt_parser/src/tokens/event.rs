//! Index-tagged events emitted by the line tokenizer
use crate::headers::OperationHeader;
use crate::rollout::RolloutPosition;
use std::fmt;

/// Separators a line can end on, as seen by completion front-ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeparatorKind {
    #[default]
    None,
    /// `=` between a node type and its name
    NodeTypeName,
    /// `/` between nodes, or the `./` relative marker
    NodeSeparator,
    /// `:` between address and operation
    AddressOperation,
    /// `(` opening the argument list
    ArgListStart,
    /// `=` between an argument name and its value
    ArgNameValue,
    /// `,` between arguments
    ArgSeparator,
    /// `{` opening the header block
    HeaderListStart,
    /// `;` between headers
    HeaderSeparator,
}

impl SeparatorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NodeTypeName => "node-type-name",
            Self::NodeSeparator => "node",
            Self::AddressOperation => "address-operation",
            Self::ArgListStart => "arg-list-start",
            Self::ArgNameValue => "arg-name-value",
            Self::ArgSeparator => "arg",
            Self::HeaderListStart => "header-list-start",
            Self::HeaderSeparator => "header",
        }
    }
}

impl fmt::Display for SeparatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    // Address
    /// Leading `/`: navigate to the root
    RootNode,
    /// `..`
    ParentNode,
    NodeType(String),
    NodeTypeNameSeparator,
    NodeName(String),
    /// A bare segment; a name when the path is pending on a type
    NodeTypeOrName(String),
    /// `.type`: turn the last node back into a pending type
    ClearNodeName,
    NodeSeparator,

    // Operation
    AddressOperationSeparator,
    OperationName(String),

    // Arguments
    PropertyListStart,
    PropertyName(String),
    PropertyNameValueSeparator,
    Property { name: String, value: String },
    /// An argument without `=`
    OtherValue(String),
    PropertySeparator,
    PropertyListEnd,

    // Headers
    HeaderListStart,
    /// `rollout` carries where the scan of a rollout clause stopped
    Header {
        header: OperationHeader,
        rollout: Option<RolloutPosition>,
    },
    HeaderSeparator,
    HeaderListEnd,

    /// Target following `>`
    OutputTarget(String),
}

impl EventKind {
    /// The separator recorded for this event, `None` for token events
    pub fn separator(&self) -> SeparatorKind {
        match self {
            Self::RootNode | Self::NodeSeparator => SeparatorKind::NodeSeparator,
            Self::NodeTypeNameSeparator => SeparatorKind::NodeTypeName,
            Self::AddressOperationSeparator => SeparatorKind::AddressOperation,
            Self::PropertyListStart => SeparatorKind::ArgListStart,
            Self::PropertyNameValueSeparator => SeparatorKind::ArgNameValue,
            Self::PropertySeparator => SeparatorKind::ArgSeparator,
            Self::HeaderListStart => SeparatorKind::HeaderListStart,
            Self::HeaderSeparator => SeparatorKind::HeaderSeparator,
            _ => SeparatorKind::None,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.separator() != SeparatorKind::None
    }

    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::RootNode => "root-node",
            Self::ParentNode => "parent-node",
            Self::NodeType(_) => "node-type",
            Self::NodeTypeNameSeparator => "node-type-name-separator",
            Self::NodeName(_) => "node-name",
            Self::NodeTypeOrName(_) => "node-type-or-name",
            Self::ClearNodeName => "clear-node-name",
            Self::NodeSeparator => "node-separator",
            Self::AddressOperationSeparator => "address-operation-separator",
            Self::OperationName(_) => "operation-name",
            Self::PropertyListStart => "property-list-start",
            Self::PropertyName(_) => "property-name",
            Self::PropertyNameValueSeparator => "property-name-value-separator",
            Self::Property { .. } => "property",
            Self::OtherValue(_) => "other-value",
            Self::PropertySeparator => "property-separator",
            Self::PropertyListEnd => "property-list-end",
            Self::HeaderListStart => "header-list-start",
            Self::Header { .. } => "header",
            Self::HeaderSeparator => "header-separator",
            Self::HeaderListEnd => "header-list-end",
            Self::OutputTarget(_) => "output-target",
        }
    }
}

/// An event and the byte offset in the line where it starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEvent {
    pub index: usize,
    pub kind: EventKind,
}

impl ParseEvent {
    pub fn new(index: usize, kind: EventKind) -> Self {
        Self { index, kind }
    }

    pub fn is_separator(&self) -> bool {
        self.kind.is_separator()
    }
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::NodeType(value)
            | EventKind::NodeName(value)
            | EventKind::NodeTypeOrName(value)
            | EventKind::OperationName(value)
            | EventKind::PropertyName(value)
            | EventKind::OtherValue(value)
            | EventKind::OutputTarget(value) => {
                write!(f, "{}@{} '{}'", self.kind.name(), self.index, value)
            }
            EventKind::Property { name, value } => {
                write!(f, "{}@{} '{}'='{}'", self.kind.name(), self.index, name, value)
            }
            EventKind::Header { header, .. } => {
                write!(f, "{}@{} '{}'", self.kind.name(), self.index, header.name())
            }
            _ => write!(f, "{}@{}", self.kind.name(), self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_classification() {
        assert_eq!(EventKind::RootNode.separator(), SeparatorKind::NodeSeparator);
        assert_eq!(
            EventKind::NodeTypeNameSeparator.separator(),
            SeparatorKind::NodeTypeName
        );
        assert!(!EventKind::PropertyListEnd.is_separator());
        assert!(!EventKind::HeaderListEnd.is_separator());
        assert!(!EventKind::OperationName("read-resource".into()).is_separator());
    }

    #[test]
    fn test_display() {
        let event = ParseEvent::new(8, EventKind::NodeName("threads".into()));
        assert_eq!(event.to_string(), "node-name@8 'threads'");
        let event = ParseEvent::new(3, EventKind::PropertySeparator);
        assert_eq!(event.to_string(), "property-separator@3");
    }
}
