//! Serializable summaries of the bound tree's frames.
//!
//! Downstream tools that consume binding results as JSON get one
//! [`FrameSummary`] per scope, in pre-order. Tables are re-keyed into
//! `BTreeMap`s and node references reduced to line numbers, so the output
//! is deterministic and self-contained.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use treebind_ast::{Frame, MethodKind, NodeId, NodeKind, SyntaxTree};

/// Summary of one scope frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Scope kind (`"module"`, `"class"`, `"function"`, ...).
    pub kind: String,
    /// Name of the module, class, or function owning the frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Line of the scope node (1-indexed).
    pub line: u32,
    /// Method classification, for function scopes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_kind: Option<MethodKind>,
    /// Bound names, each with the lines of its defining nodes in
    /// registration order.
    pub locals: BTreeMap<String, Vec<u32>>,
    /// Instance attributes (class scopes only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub instance_attrs: BTreeMap<String, Vec<u32>>,
}

/// Summarize every frame of a bound tree, in pre-order.
pub fn summarize(tree: &SyntaxTree) -> Vec<FrameSummary> {
    let mut out = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(node) = stack.pop() {
        if let Some(frame) = tree.frame(node) {
            out.push(summarize_frame(tree, node, frame));
        }
        let mut children = tree.node(node).kind.children();
        children.reverse();
        stack.extend(children);
    }
    out
}

fn summarize_frame(tree: &SyntaxTree, node: NodeId, frame: &Frame) -> FrameSummary {
    let (name, method_kind) = match &tree.node(node).kind {
        NodeKind::Module { name, .. } | NodeKind::ClassDef { name, .. } => {
            (Some(name.clone()), None)
        }
        NodeKind::FunctionDef {
            name, method_kind, ..
        } => (Some(name.clone()), Some(*method_kind)),
        _ => (None, None),
    };
    FrameSummary {
        kind: tree.node(node).tag().as_str().to_string(),
        name,
        line: tree.node(node).line,
        method_kind,
        locals: table_lines(tree, frame.locals()),
        instance_attrs: table_lines(tree, frame.instance_attrs()),
    }
}

fn table_lines(
    tree: &SyntaxTree,
    table: &std::collections::HashMap<String, Vec<NodeId>>,
) -> BTreeMap<String, Vec<u32>> {
    table
        .iter()
        .map(|(name, defs)| {
            let lines = defs.iter().map(|def| tree.node(*def).line).collect();
            (name.clone(), lines)
        })
        .collect()
}
