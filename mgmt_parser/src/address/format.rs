//! Rendering an address back into line syntax

use super::AddressPath;
use crate::grammar::separators::{ESCAPE, NODE, NODE_NAME_RESERVED, NODE_TYPE_NAME};

/// Renders paths as `/type=name/type=name`.
///
/// A pending last node is rendered as `/type`. Reserved characters in names
/// are backslash-escaped so the output parses back to the same path.
#[derive(Debug, Clone, Copy)]
pub struct NodePathFormatter {
    /// Emit the leading `/`
    pub absolute: bool,
}

impl Default for NodePathFormatter {
    fn default() -> Self {
        Self { absolute: true }
    }
}

impl NodePathFormatter {
    pub fn relative() -> Self {
        Self { absolute: false }
    }

    pub fn format(&self, path: &AddressPath) -> String {
        let mut out = String::new();
        for (i, node) in path.iter().enumerate() {
            if i > 0 || self.absolute {
                out.push(NODE);
            }
            out.push_str(node.node_type());
            if let Some(name) = node.name() {
                out.push(NODE_TYPE_NAME);
                push_escaped(&mut out, name);
            }
        }
        if out.is_empty() && self.absolute {
            out.push(NODE);
        }
        out
    }
}

fn push_escaped(out: &mut String, name: &str) {
    for c in name.chars() {
        if NODE_NAME_RESERVED.contains(&c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{parse_events, ParsePolicy};

    #[test]
    fn test_format_absolute_and_relative() {
        let path =
            AddressPath::from_pairs([("profile", "production"), ("subsystem", "threads")]).unwrap();
        assert_eq!(
            NodePathFormatter::default().format(&path),
            "/profile=production/subsystem=threads"
        );
        assert_eq!(
            NodePathFormatter::relative().format(&path),
            "profile=production/subsystem=threads"
        );
    }

    #[test]
    fn test_format_root_and_pending() {
        assert_eq!(AddressPath::new().to_string(), "/");

        let mut path = AddressPath::from_pairs([("subsystem", "threads")]).unwrap();
        path.descend_type("thread-pool").unwrap();
        assert_eq!(path.to_string(), "/subsystem=threads/thread-pool");
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let path = AddressPath::from_pairs([("data-source", "java:/H2DS")]).unwrap();
        assert_eq!(path.to_string(), "/data-source=java\\:\\/H2DS");
    }

    #[test]
    fn test_formatted_path_parses_back() {
        let paths = [
            AddressPath::from_pairs([("x", "a[b"), ("y", "c")]).unwrap(),
            AddressPath::from_pairs([("x", "a]b"), ("y", "[c]")]).unwrap(),
            AddressPath::from_pairs([("data-source", "java:/H2DS"), ("conf", "a=b,c")]).unwrap(),
            AddressPath::from_pairs([("x", "{a;b}"), ("y", "(c) > \\\"d\\\"")]).unwrap(),
        ];
        for path in paths {
            let text = NodePathFormatter::default().format(&path);
            let state = parse_events(&AddressPath::new(), &text, ParsePolicy::operation())
                .unwrap_or_else(|err| panic!("{} did not parse: {}", text, err));
            assert_eq!(state.address(), Some(&path), "{}", text);
        }
    }
}
