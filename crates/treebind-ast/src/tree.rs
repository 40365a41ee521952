//! The syntax tree arena.

use crate::frame::Frame;
use crate::node::{NodeId, NodeKind, SyntaxNode};

/// An arena of [`SyntaxNode`]s rooted at a module.
///
/// Nodes are addressed by [`NodeId`] and never move or disappear once
/// created; structural references (parent links, child fields) are ids into
/// this arena. The tree is built raw by [`crate::TreeBuilder`] and annotated
/// in place by a binding pass.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    pub(crate) fn from_parts(nodes: Vec<SyntaxNode>, root: NodeId) -> Self {
        SyntaxTree { nodes, root }
    }

    /// The root module node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Shared access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn node_mut(&mut self, id: NodeId) -> &mut SyntaxNode {
        &mut self.nodes[id.index()]
    }

    /// Append a node to the arena, returning its id.
    ///
    /// Used by the builder and by the binder when it creates synthetic
    /// nodes (seeded constant bindings). The new node is not wired into any
    /// parent's child list.
    pub fn push(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SyntaxNode::new(kind, line));
        id
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SyntaxNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i), node))
    }

    /// The frame of `id`, if `id` is a scope node that has been bound.
    pub fn frame(&self, id: NodeId) -> Option<&Frame> {
        self.node(id).frame.as_ref()
    }

    /// Mutable frame access.
    pub fn frame_mut(&mut self, id: NodeId) -> Option<&mut Frame> {
        self.node_mut(id).frame.as_mut()
    }

    /// Attach a fresh, empty frame to `id`, replacing any existing one.
    pub fn open_frame(&mut self, id: NodeId) {
        self.node_mut(id).frame = Some(Frame::new());
    }

    /// The nearest scope node at or above `start` that owns a frame.
    ///
    /// Walks the parent chain, so it is only meaningful once the binder has
    /// assigned parents down to `start`.
    ///
    /// # Panics
    ///
    /// Panics if no enclosing frame exists, which means the tree is not
    /// rooted at a bound module: a contract violation by the caller, not a
    /// recoverable condition.
    pub fn frame_root(&self, start: NodeId) -> NodeId {
        let mut current = Some(start);
        while let Some(id) = current {
            if self.node(id).frame.is_some() {
                return id;
            }
            current = self.node(id).parent;
        }
        panic!(
            "no enclosing frame above node {} ({}); tree is not rooted at a bound module",
            start,
            self.node(start).tag()
        );
    }

    /// The name of the root module.
    ///
    /// # Panics
    ///
    /// Panics if the root node is not a module.
    pub fn module_name(&self) -> &str {
        match &self.node(self.root).kind {
            NodeKind::Module { name, .. } => name,
            other => panic!("tree root is a {}, not a module", other.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::build::TreeBuilder;
    use crate::node::NodeTag;

    #[test]
    fn push_assigns_sequential_ids() {
        let mut b = TreeBuilder::new("m", "m.py");
        let first = b.name("a", 1);
        let second = b.name("b", 1);
        assert_eq!(first.index() + 1, second.index());
    }

    #[test]
    fn root_is_module() {
        let b = TreeBuilder::new("m", "m.py");
        let tree = b.finish(vec![]);
        assert_eq!(tree.node(tree.root()).tag(), NodeTag::Module);
        assert_eq!(tree.module_name(), "m");
    }

    #[test]
    fn frames_start_absent() {
        let mut b = TreeBuilder::new("m", "m.py");
        let stmt = b.pass_stmt(1);
        let tree = b.finish(vec![stmt]);
        assert!(tree.frame(tree.root()).is_none());
        assert!(tree.frame(stmt).is_none());
    }

    #[test]
    fn open_frame_replaces() {
        let b = TreeBuilder::new("m", "m.py");
        let mut tree = b.finish(vec![]);
        let root = tree.root();
        tree.open_frame(root);
        tree.frame_mut(root).unwrap().add_local("x", root);
        tree.open_frame(root);
        assert!(tree.frame(root).unwrap().local("x").is_none());
    }

    #[test]
    #[should_panic(expected = "no enclosing frame")]
    fn frame_root_panics_without_module_frame() {
        let mut b = TreeBuilder::new("m", "m.py");
        let stmt = b.pass_stmt(1);
        let tree = b.finish(vec![stmt]);
        tree.frame_root(stmt);
    }
}
