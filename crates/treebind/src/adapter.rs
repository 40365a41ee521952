//! Collaborator interfaces the binder depends on.
//!
//! The binder itself never loads modules, infers types, or renders source:
//! those concerns live behind the traits here, so hosts plug in whatever
//! module system and inference engine they have. Inert defaults
//! ([`NullLoader`], [`NullInference`]) and a minimal expression renderer
//! ([`SimpleRenderer`]) are provided for embeddings and tests that do not
//! need the full collaborators.

use treebind_ast::{NodeId, NodeKind, SyntaxTree};

use crate::error::{InferenceError, ModuleLoadError};

/// One candidate entity for the owner expression of an attribute
/// assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inferred {
    /// The engine could not narrow the expression down; skipped by the
    /// resolver.
    Unknown,
    /// An instance of the class at the given node. Attribute definitions
    /// land in the class's instance-attributes table.
    Instance(NodeId),
    /// The entity at the given node itself (a class, module, function...).
    /// Attribute definitions land in its locals table.
    Entity(NodeId),
}

/// The candidate sequence produced by one inference request.
///
/// Finite and lazy; a fresh sequence is computed for every request, so
/// engines need no cross-request caching.
pub type Candidates<'t> = Box<dyn Iterator<Item = Inferred> + 't>;

/// Type-inference collaborator used by the deferred attribute pass.
pub trait InferenceEngine {
    /// Infer the candidate entities `expr` may evaluate to.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError`] when the engine cannot produce candidates
    /// at all; the resolver skips the single node being processed and
    /// continues with the rest of its queue.
    fn infer<'t>(&self, tree: &'t SyntaxTree, expr: NodeId)
        -> Result<Candidates<'t>, InferenceError>;
}

/// A module resolved by the [`ModuleLoader`].
pub trait LoadedModule {
    /// The names this module exposes to `from module import *`.
    fn wildcard_exported_names(&self) -> Vec<String>;
}

/// Module-loading collaborator used for wildcard imports.
pub trait ModuleLoader {
    /// Resolve and load `module`.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleLoadError`] when the module cannot be loaded; the
    /// import statement then contributes zero bindings and the walk
    /// continues.
    fn load(&mut self, module: &str) -> Result<Box<dyn LoadedModule>, ModuleLoadError>;
}

/// Source-rendering collaborator.
///
/// Used only to cache a human-readable form of base-class expressions.
/// Pure and total: every expression renders to *some* text.
pub trait SourceRenderer {
    /// Render `expr` as source-like text.
    fn render(&self, tree: &SyntaxTree, expr: NodeId) -> String;
}

/// A loader for embeddings without a module system: every load fails, so
/// wildcard imports bind nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoader;

impl ModuleLoader for NullLoader {
    fn load(&mut self, module: &str) -> Result<Box<dyn LoadedModule>, ModuleLoadError> {
        Err(ModuleLoadError::new(module, "module loading is disabled"))
    }
}

/// An engine that infers nothing: every request yields an empty candidate
/// sequence, so deferred attribute nodes register nowhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInference;

impl InferenceEngine for NullInference {
    fn infer<'t>(
        &self,
        _tree: &'t SyntaxTree,
        _expr: NodeId,
    ) -> Result<Candidates<'t>, InferenceError> {
        Ok(Box::new(std::iter::empty()))
    }
}

/// A small structural renderer covering the expression kinds that commonly
/// appear in base-class lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SourceRenderer for SimpleRenderer {
    fn render(&self, tree: &SyntaxTree, expr: NodeId) -> String {
        render_expr(tree, expr)
    }
}

fn render_expr(tree: &SyntaxTree, expr: NodeId) -> String {
    match &tree.node(expr).kind {
        NodeKind::Name { id } | NodeKind::AssignName { id } | NodeKind::DelName { id } => {
            id.clone()
        }
        NodeKind::Attribute { value, attr }
        | NodeKind::AssignAttr { value, attr }
        | NodeKind::DelAttr { value, attr } => {
            format!("{}.{}", render_expr(tree, *value), attr)
        }
        NodeKind::Const { value } => value.to_string(),
        NodeKind::Subscript { value, index } => format!(
            "{}[{}]",
            render_expr(tree, *value),
            render_expr(tree, *index)
        ),
        NodeKind::Call {
            func,
            args,
            keywords,
        } => {
            let mut parts: Vec<String> = args.iter().map(|a| render_expr(tree, *a)).collect();
            parts.extend(keywords.iter().map(|k| render_expr(tree, *k)));
            format!("{}({})", render_expr(tree, *func), parts.join(", "))
        }
        NodeKind::Keyword { arg, value } => format!("{}={}", arg, render_expr(tree, *value)),
        NodeKind::Tuple { elements } => format!("({})", render_list(tree, elements)),
        NodeKind::List { elements } => format!("[{}]", render_list(tree, elements)),
        NodeKind::BinOp { left, op, right } => format!(
            "{} {} {}",
            render_expr(tree, *left),
            op,
            render_expr(tree, *right)
        ),
        NodeKind::UnaryOp { op, operand } => {
            if op.chars().all(char::is_alphabetic) {
                format!("{} {}", op, render_expr(tree, *operand))
            } else {
                format!("{}{}", op, render_expr(tree, *operand))
            }
        }
        other => format!("<{}>", other.tag()),
    }
}

fn render_list(tree: &SyntaxTree, elements: &[NodeId]) -> String {
    elements
        .iter()
        .map(|e| render_expr(tree, *e))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use treebind_ast::TreeBuilder;

    #[test]
    fn renders_dotted_names() {
        let mut b = TreeBuilder::new("m", "m.py");
        let base = b.name("collections", 1);
        let attr = b.attribute(base, "OrderedDict", 1);
        let tree = b.finish(vec![]);
        assert_eq!(
            SimpleRenderer.render(&tree, attr),
            "collections.OrderedDict"
        );
    }

    #[test]
    fn renders_calls_with_keywords() {
        let mut b = TreeBuilder::new("m", "m.py");
        let func = b.name("namedtuple", 1);
        let arg = b.str_lit("Point", 1);
        let kw_value = b.str_lit("x y", 1);
        let kw = b.keyword("fields", kw_value, 1);
        let call = b.call_with_keywords(func, vec![arg], vec![kw], 1);
        let tree = b.finish(vec![]);
        assert_eq!(
            SimpleRenderer.render(&tree, call),
            "namedtuple(\"Point\", fields=\"x y\")"
        );
    }

    #[test]
    fn unknown_kinds_render_as_tag() {
        let mut b = TreeBuilder::new("m", "m.py");
        let body = b.name("x", 1);
        let args = b.arguments(vec![], vec![], None, None, 1);
        let lambda = b.lambda(args, body, 1);
        let tree = b.finish(vec![]);
        assert_eq!(SimpleRenderer.render(&tree, lambda), "<lambda>");
    }

    #[test]
    fn null_loader_always_fails() {
        assert!(NullLoader.load("anything").is_err());
    }

    #[test]
    fn null_inference_is_empty() {
        let tree = TreeBuilder::new("m", "m.py").finish(vec![]);
        let root = tree.root();
        let candidates: Vec<Inferred> = NullInference.infer(&tree, root).unwrap().collect();
        assert!(candidates.is_empty());
    }
}
