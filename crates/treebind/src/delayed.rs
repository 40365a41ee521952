//! The deferred attribute pass.
//!
//! Attribute-assignment targets (`owner.attr = value`, `del owner.attr`)
//! cannot be resolved during the walk: which class they belong to depends
//! on what `owner` evaluates to, and answering that requires the completed
//! locals tables of the whole tree. The walk therefore queues these nodes,
//! and this pass drains the queue, in discovery order, once the walk has
//! returned to the root.
//!
//! Every failure here is contained to the smallest unit: a failed
//! inference skips one queued node, an unusable candidate skips one
//! candidate. The pass itself never fails.

use std::collections::VecDeque;

use tracing::{debug, warn};

use treebind_ast::{NodeId, NodeKind, SyntaxTree};

use crate::adapter::{InferenceEngine, Inferred};

/// The constructor method whose attribute assignments are surfaced first.
const INIT_METHOD: &str = "__init__";

pub(crate) fn resolve_delayed(
    tree: &mut SyntaxTree,
    mut queue: VecDeque<NodeId>,
    inference: &dyn InferenceEngine,
) {
    while let Some(node) = queue.pop_front() {
        resolve_one(tree, node, inference);
    }
}

fn resolve_one(tree: &mut SyntaxTree, node: NodeId, inference: &dyn InferenceEngine) {
    let (owner, attr) = match &tree.node(node).kind {
        NodeKind::AssignAttr { value, attr } | NodeKind::DelAttr { value, attr } => {
            (*value, attr.clone())
        }
        _ => return,
    };
    let in_ctor = in_constructor(tree, node);
    let candidates: Vec<Inferred> = match inference.infer(tree, owner) {
        Ok(sequence) => sequence.collect(),
        Err(err) => {
            debug!(node = %node, attr = %attr, error = %err, "owner inference failed; node skipped");
            return;
        }
    };
    for candidate in candidates {
        let (entity, instance) = match candidate {
            Inferred::Unknown => continue,
            Inferred::Instance(class) => (class, true),
            Inferred::Entity(entity) => (entity, false),
        };
        register(tree, node, entity, instance, &attr, in_ctor);
    }
}

/// Append `node` under `attr` in the candidate's table, unless it is
/// already present. Constructor assignments are promoted to the front of
/// the entry when the current head is not itself from a constructor, so
/// downstream consumers always see the constructor's definition first.
fn register(
    tree: &mut SyntaxTree,
    node: NodeId,
    entity: NodeId,
    instance: bool,
    attr: &str,
    in_ctor: bool,
) {
    let existing: Vec<NodeId> = match tree.frame(entity) {
        Some(frame) => {
            let entry = if instance {
                frame.instance_attr(attr)
            } else {
                frame.local(attr)
            };
            entry.map(<[NodeId]>::to_vec).unwrap_or_default()
        }
        None => {
            warn!(
                entity = %entity,
                kind = %tree.node(entity).tag(),
                "inferred attribute owner has no name tables; candidate skipped"
            );
            return;
        }
    };
    if existing.contains(&node) {
        return;
    }
    let promote = in_ctor
        && existing
            .first()
            .is_some_and(|head| !in_constructor(tree, *head));
    if let Some(frame) = tree.frame_mut(entity) {
        let entry = if instance {
            frame.instance_attrs_entry(attr)
        } else {
            frame.locals_entry(attr)
        };
        if promote {
            entry.insert(0, node);
        } else {
            entry.push(node);
        }
    }
}

/// Whether `node` sits inside a constructor method's frame.
fn in_constructor(tree: &SyntaxTree, node: NodeId) -> bool {
    let scope = tree.frame_root(node);
    matches!(&tree.node(scope).kind, NodeKind::FunctionDef { name, .. } if name == INIT_METHOD)
}
