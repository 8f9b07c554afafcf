// Config-like message tree exchanged with the relay.
//
// A `Node` is an ordered list of named children plus a flat map of string
// attributes. Every relay message is a `Node` whose single top-level child
// names the message kind (see `message.rs`). Children keep insertion order,
// which matters for commands inside a turn; attributes are keyed and sorted,
// which keeps the JSON encoding canonical.
//
// Integer and boolean attributes are stored as strings and parsed on read,
// matching how the relay forwards them untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named tree node with string attributes and ordered children.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<(String, Node)>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `set_attr`.
    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of `add_child`.
    pub fn with_child(mut self, name: &str, child: Node) -> Self {
        self.add_child(name, child);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        self.attributes.insert(key.to_owned(), value.to_string());
    }

    /// Append a child, returning a mutable reference to it.
    pub fn add_child(&mut self, name: &str, child: Node) -> &mut Node {
        self.children.push((name.to_owned(), child));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(child_name, _)| child_name == name)
            .map(|(_, node)| node)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// All children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children
            .iter()
            .map(|(name, node)| (name.as_str(), node))
    }

    pub fn all_children_count(&self) -> usize {
        self.children.len()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Parse an integer attribute. Missing or unparsable values yield
    /// `default`.
    pub fn attr_int(&self, key: &str, default: i64) -> i64 {
        self.attr(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Parse a boolean attribute (`yes`/`true`/`1` or `no`/`false`/`0`).
    pub fn attr_bool(&self, key: &str, default: bool) -> bool {
        match self.attr(key).map(str::trim) {
            Some("yes" | "true" | "1") => true,
            Some("no" | "false" | "0") => false,
            _ => default,
        }
    }

    /// True when the node has neither attributes nor children.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Compact one-line rendering for log output.
    pub fn debug(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
