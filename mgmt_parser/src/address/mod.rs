//! Resource addresses and their navigation algebra
//!
//! An [`AddressPath`] is an ordered list of `type=name` nodes identifying a
//! position in the managed resource tree. Only the last node may lack a name;
//! such a node is a *pending type* and is what interactive completion sees
//! right after `type=` has been typed.
//!
//! Paths are only ever changed through their navigation operations. Cloning a
//! path is a deep copy, so a prefix can be shared as a template across parse
//! sessions.

pub mod error;
pub mod format;

pub use error::{AddressError, AddressResult};
pub use format::NodePathFormatter;

use crate::config::compile_time::address::MAX_ADDRESS_DEPTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single `type=name` step of an address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    node_type: String,
    name: Option<String>,
}

impl Node {
    pub fn new(node_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            name: Some(name.into()),
        }
    }

    fn pending(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            name: None,
        }
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.name.is_none()
    }
}

/// Ordered sequence of nodes from the root of the resource tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPath {
    nodes: Vec<Node>,
}

impl AddressPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fully named path from `(type, name)` pairs
    pub fn from_pairs<'a, I>(pairs: I) -> AddressResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut path = Self::new();
        for (node_type, name) in pairs {
            path.descend_type_name(node_type, name)?;
        }
        Ok(path)
    }

    /// Append a pending node of the given type.
    pub fn descend_type(&mut self, node_type: &str) -> AddressResult<()> {
        self.check_can_descend(node_type)?;
        self.nodes.push(Node::pending(node_type));
        Ok(())
    }

    /// Name the pending node at the end of the path.
    pub fn descend_name(&mut self, name: &str) -> AddressResult<()> {
        if name.is_empty() {
            return Err(AddressError::malformed("node name is empty"));
        }
        match self.nodes.last_mut() {
            Some(node) if node.name.is_none() => {
                node.name = Some(name.to_string());
                Ok(())
            }
            Some(node) => Err(AddressError::malformed(format!(
                "name '{}' given but '{}' already has a name",
                name, node.node_type
            ))),
            None => Err(AddressError::malformed(format!(
                "name '{}' given before any node type",
                name
            ))),
        }
    }

    /// Append a fully named node.
    pub fn descend_type_name(&mut self, node_type: &str, name: &str) -> AddressResult<()> {
        self.check_can_descend(node_type)?;
        if name.is_empty() {
            return Err(AddressError::malformed("node name is empty"));
        }
        self.nodes.push(Node::new(node_type, name));
        Ok(())
    }

    fn check_can_descend(&self, node_type: &str) -> AddressResult<()> {
        if node_type.is_empty() {
            return Err(AddressError::malformed("node type is empty"));
        }
        if let Some(pending) = self.nodes.last().filter(|n| n.is_pending()) {
            return Err(AddressError::malformed(format!(
                "type '{}' given while '{}' is still waiting for a name",
                node_type, pending.node_type
            )));
        }
        if self.nodes.len() >= MAX_ADDRESS_DEPTH {
            return Err(AddressError::TooDeep {
                max: MAX_ADDRESS_DEPTH,
            });
        }
        Ok(())
    }

    /// Pop the last node. Above the root this is a no-op returning `None`.
    pub fn ascend_to_parent(&mut self) -> Option<Node> {
        self.nodes.pop()
    }

    /// Turn the last named node back into a pending type.
    pub fn revert_to_type(&mut self) -> AddressResult<()> {
        match self.nodes.last_mut() {
            Some(node) => {
                node.name = None;
                Ok(())
            }
            None => Err(AddressError::malformed(
                "no node to revert to a type at the root",
            )),
        }
    }

    pub fn clear_pending_type(&mut self) {
        self.nodes.clear();
    }

    pub fn to_root(&mut self) {
        self.nodes.clear();
    }

    /// Append deep copies of every node of `other`.
    pub fn append_path(&mut self, other: &AddressPath) -> AddressResult<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_pending_type() {
            return Err(AddressError::malformed(
                "cannot append to a path that ends on a pending type",
            ));
        }
        if self.nodes.len() + other.nodes.len() > MAX_ADDRESS_DEPTH {
            return Err(AddressError::TooDeep {
                max: MAX_ADDRESS_DEPTH,
            });
        }
        self.nodes.extend(other.nodes.iter().cloned());
        Ok(())
    }

    pub fn is_pending_type(&self) -> bool {
        self.nodes.last().is_some_and(Node::is_pending)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn last_type(&self) -> Option<&str> {
        self.nodes.last().map(|n| n.node_type.as_str())
    }

    pub fn last_name(&self) -> Option<&str> {
        self.nodes.last().and_then(|n| n.name.as_deref())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Index of the first pending node, if any
    pub fn first_pending(&self) -> Option<usize> {
        self.nodes.iter().position(Node::is_pending)
    }
}

impl<'a> IntoIterator for &'a AddressPath {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for AddressPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&NodePathFormatter::default().format(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn path(pairs: &[(&str, &str)]) -> AddressPath {
        AddressPath::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_descend_type_then_name() {
        let mut address = AddressPath::new();
        address.descend_type("subsystem").unwrap();
        assert!(address.is_pending_type());
        assert_eq!(address.last_type(), Some("subsystem"));
        assert_eq!(address.last_name(), None);

        address.descend_name("threads").unwrap();
        assert!(!address.is_pending_type());
        assert_eq!(address, path(&[("subsystem", "threads")]));
    }

    #[test]
    fn test_type_while_pending_is_malformed() {
        let mut address = AddressPath::new();
        address.descend_type("subsystem").unwrap();
        assert_matches!(
            address.descend_type("profile"),
            Err(AddressError::MalformedAddress { .. })
        );
        assert_matches!(
            address.descend_type_name("profile", "full"),
            Err(AddressError::MalformedAddress { .. })
        );
        assert_eq!(address.len(), 1);
    }

    #[test]
    fn test_name_without_pending_type_is_malformed() {
        let mut address = AddressPath::new();
        assert_matches!(
            address.descend_name("threads"),
            Err(AddressError::MalformedAddress { .. })
        );

        address.descend_type_name("subsystem", "threads").unwrap();
        assert_matches!(
            address.descend_name("other"),
            Err(AddressError::MalformedAddress { .. })
        );

        address.descend_type("thread-pool").unwrap();
        assert_matches!(
            address.descend_name(""),
            Err(AddressError::MalformedAddress { .. })
        );
    }

    #[test]
    fn test_ascend_above_root_is_noop() {
        let mut address = path(&[("profile", "production")]);
        let popped = address.ascend_to_parent();
        assert_eq!(popped, Some(Node::new("profile", "production")));
        assert_eq!(address.ascend_to_parent(), None);
        assert!(address.is_empty());
    }

    #[test]
    fn test_to_root_is_idempotent() {
        let mut once = path(&[("a", "b"), ("c", "d")]);
        once.to_root();
        let mut twice = once.clone();
        twice.to_root();
        assert_eq!(once, twice);
        assert!(twice.is_empty());

        let mut pending = path(&[("a", "b")]);
        pending.descend_type("c").unwrap();
        pending.clear_pending_type();
        assert_eq!(pending, AddressPath::new());
    }

    #[test]
    fn test_revert_to_type() {
        let mut address = path(&[("a", "b")]);
        address.revert_to_type().unwrap();
        assert!(address.is_pending_type());
        address.descend_name("c").unwrap();
        assert_eq!(address, path(&[("a", "c")]));

        assert_matches!(
            AddressPath::new().revert_to_type(),
            Err(AddressError::MalformedAddress { .. })
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let template = path(&[("profile", "production")]);
        let mut session = template.clone();
        session.descend_type_name("subsystem", "threads").unwrap();
        assert_eq!(template.len(), 1);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_append_path_copies_names() {
        let mut base = path(&[("profile", "production")]);
        let child = path(&[("subsystem", "threads"), ("thread-pool", "default")]);
        base.append_path(&child).unwrap();

        let collected: Vec<_> = base.iter().map(|n| (n.node_type(), n.name())).collect();
        assert_eq!(
            collected,
            vec![
                ("profile", Some("production")),
                ("subsystem", Some("threads")),
                ("thread-pool", Some("default")),
            ]
        );
        assert_eq!(child.len(), 2);
    }

    #[test]
    fn test_append_to_pending_is_malformed() {
        let mut base = AddressPath::new();
        base.descend_type("profile").unwrap();
        assert_matches!(
            base.append_path(&path(&[("a", "b")])),
            Err(AddressError::MalformedAddress { .. })
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut address = AddressPath::new();
        for i in 0..MAX_ADDRESS_DEPTH {
            address.descend_type_name("t", &i.to_string()).unwrap();
        }
        assert_matches!(
            address.descend_type("t"),
            Err(AddressError::TooDeep { .. })
        );
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        assert_ne!(
            path(&[("a", "b"), ("c", "d")]),
            path(&[("c", "d"), ("a", "b")])
        );
    }
}
