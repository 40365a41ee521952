//! Scope frames: the name tables attached to scope-introducing nodes.

use std::collections::HashMap;

use crate::node::NodeId;

/// The name tables of one scope.
///
/// `locals` maps each name bound in the scope to the nodes that define it,
/// in registration order. Entries are only ever appended to (or, for the
/// constructor-promotion rule of the deferred attribute pass, prepended);
/// a name, once registered, is never dropped or overwritten.
///
/// `instance_attrs` has the same shape and is meaningful only on class
/// frames: it is left empty by the walk and filled by the deferred
/// attribute pass.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    locals: HashMap<String, Vec<NodeId>>,
    instance_attrs: HashMap<String, Vec<NodeId>>,
}

impl Frame {
    /// An empty frame.
    pub fn new() -> Self {
        Frame::default()
    }

    /// Register `def` as a defining node for `name` in this scope.
    pub fn add_local(&mut self, name: &str, def: NodeId) {
        self.locals_entry(name).push(def);
    }

    /// The defining nodes recorded for `name`, in registration order.
    pub fn local(&self, name: &str) -> Option<&[NodeId]> {
        self.locals.get(name).map(Vec::as_slice)
    }

    /// The full locals table.
    pub fn locals(&self) -> &HashMap<String, Vec<NodeId>> {
        &self.locals
    }

    /// Mutable entry for `name` in the locals table, created empty if absent.
    pub fn locals_entry(&mut self, name: &str) -> &mut Vec<NodeId> {
        self.locals.entry(name.to_string()).or_default()
    }

    /// The instance-attribute nodes recorded for `name`.
    pub fn instance_attr(&self, name: &str) -> Option<&[NodeId]> {
        self.instance_attrs.get(name).map(Vec::as_slice)
    }

    /// The full instance-attributes table.
    pub fn instance_attrs(&self) -> &HashMap<String, Vec<NodeId>> {
        &self.instance_attrs
    }

    /// Mutable entry for `name` in the instance-attributes table, created
    /// empty if absent.
    pub fn instance_attrs_entry(&mut self, name: &str) -> &mut Vec<NodeId> {
        self.instance_attrs.entry(name.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_keep_registration_order() {
        let mut frame = Frame::new();
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        frame.add_local("x", a);
        frame.add_local("x", b);
        assert_eq!(frame.local("x"), Some(&[a, b][..]));
    }

    #[test]
    fn missing_names_are_none() {
        let frame = Frame::new();
        assert!(frame.local("x").is_none());
        assert!(frame.instance_attr("x").is_none());
    }

    #[test]
    fn instance_attr_entry_creates_empty() {
        let mut frame = Frame::new();
        assert!(frame.instance_attrs_entry("attr").is_empty());
        frame.instance_attrs_entry("attr").push(NodeId::new(3));
        assert_eq!(frame.instance_attr("attr").map(<[NodeId]>::len), Some(1));
    }
}
