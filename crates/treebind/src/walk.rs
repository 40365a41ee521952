//! The binding walk: one recursive pre-order pass over a raw tree.
//!
//! For every node the walk assigns the parent link and line range, then
//! runs the enter handler for its kind, visits the children (computing the
//! assignment-context marker for each child first), and finally runs the
//! leave handler. Handlers are dispatched by an exhaustive match over
//! [`NodeTag`], so a kind without an explicit handler is a deliberate
//! no-op arm, never a silently missing method.
//!
//! Attribute-assignment targets are not resolved during the walk; they are
//! queued and handed to the deferred pass once the walk has returned to
//! the root, when every locals table is complete.

use tracing::{debug, trace};

use treebind_ast::{ConstValue, MethodKind, NodeId, NodeKind, NodeTag, SyntaxTree};

use crate::adapter::{InferenceEngine, ModuleLoader, SourceRenderer};
use crate::delayed::resolve_delayed;
use crate::state::{Metaclass, WalkState};

/// The implicit instantiation hook, classified as a classmethod.
const NEW_METHOD: &str = "__new__";
/// The attribute name that declares a class-governing metaclass.
const METACLASS_ATTR: &str = "__metaclass__";
/// Built-in wrappers that reclassify a method.
const CLASSMETHOD: &str = "classmethod";
const STATICMETHOD: &str = "staticmethod";

/// Binds a raw syntax tree in place: parent links, line ranges, scope
/// frames with their locals, method kinds, new-style flags, and (through
/// the deferred pass) instance attributes.
///
/// One [`Binder`] may bind several trees; each call to [`Binder::bind`]
/// uses a fresh walk state. The walk recurses once per nesting level of
/// the source, so the supported nesting depth is bounded by the host's
/// stack; embedders handling adversarially nested input should run the
/// bind on a thread with a suitably sized stack.
pub struct Binder<'c> {
    loader: &'c mut dyn ModuleLoader,
    inference: &'c dyn InferenceEngine,
    renderer: &'c dyn SourceRenderer,
}

impl<'c> Binder<'c> {
    /// Create a binder over the given collaborators.
    pub fn new(
        loader: &'c mut dyn ModuleLoader,
        inference: &'c dyn InferenceEngine,
        renderer: &'c dyn SourceRenderer,
    ) -> Self {
        Binder {
            loader,
            inference,
            renderer,
        }
    }

    /// Annotate `tree` in place.
    ///
    /// Runs the recursive walk, then drains the deferred attribute queue
    /// in discovery order. The deferred pass must not start earlier: it
    /// reads completed locals tables, not partially built ones.
    ///
    /// # Panics
    ///
    /// Panics if the tree violates its structural contract (e.g. it is not
    /// rooted at a module).
    pub fn bind(&mut self, tree: &mut SyntaxTree) {
        let mut state = WalkState::new();
        let root = tree.root();
        self.walk(tree, &mut state, root, None);
        let queue = state.take_delayed();
        resolve_delayed(tree, queue, self.inference);
    }

    fn walk(
        &mut self,
        tree: &mut SyntaxTree,
        state: &mut WalkState,
        node: NodeId,
        parent: Option<NodeId>,
    ) {
        {
            let n = tree.node_mut(node);
            n.parent = parent;
            n.from_line = n.line;
        }
        self.enter(tree, state, node);
        let children = tree.node(node).kind.children();
        let mut last = None;
        for child in children {
            self.set_context(tree, state, node, child);
            self.walk(tree, state, child, Some(node));
            if state.assign_context == Some(child) {
                state.assign_context = None;
            }
            last = Some(child);
        }
        self.close_line_info(tree, node, last);
        self.leave(tree, state, node);
    }

    /// Decide whether `child` is in binding context under `parent`.
    ///
    /// A child is in binding context exactly when it is a target of a
    /// deletion or plain assignment, the single target of an augmented
    /// assignment, `for` loop, or comprehension clause, a declared
    /// parameter, or the bound name of an exception handler. Subscript
    /// children are explicitly read context: `d[k] = v` subscripts `d`, it
    /// does not bind it. Any other parent kind leaves the marker alone, so
    /// a binding target that is a tuple or list display propagates the
    /// context down to the names inside it.
    fn set_context(
        &self,
        tree: &SyntaxTree,
        state: &mut WalkState,
        parent: NodeId,
        child: NodeId,
    ) {
        match &tree.node(parent).kind {
            NodeKind::Delete { targets } | NodeKind::Assign { targets, .. } => {
                state.assign_context = if targets.contains(&child) {
                    Some(parent)
                } else {
                    None
                };
            }
            NodeKind::AugAssign { target, .. }
            | NodeKind::For { target, .. }
            | NodeKind::CompFor { target, .. } => {
                state.assign_context = if *target == child { Some(parent) } else { None };
            }
            NodeKind::Arguments { args, .. } => {
                state.assign_context = if args.contains(&child) {
                    Some(parent)
                } else {
                    None
                };
            }
            NodeKind::ExceptHandler { name, .. } => {
                state.assign_context = if *name == Some(child) {
                    Some(parent)
                } else {
                    None
                };
            }
            NodeKind::Subscript { .. } => {
                state.assign_context = None;
            }
            _ => {}
        }
    }

    fn close_line_info(&self, tree: &mut SyntaxTree, node: NodeId, last_child: Option<NodeId>) {
        let to_line = match last_child {
            Some(child) => tree.node(child).to_line,
            None => tree.node(node).from_line,
        };
        tree.node_mut(node).to_line = to_line;
    }

    fn enter(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let tag = tree.node(node).tag();
        match tag {
            NodeTag::Module => self.enter_module(tree, node),
            NodeTag::ClassDef => self.enter_class(tree, state, node),
            NodeTag::FunctionDef => self.enter_function(tree, state, node),
            NodeTag::Lambda
            | NodeTag::GeneratorExp
            | NodeTag::ListComp
            | NodeTag::SetComp
            | NodeTag::DictComp => tree.open_frame(node),
            NodeTag::Arguments => self.enter_arguments(tree, node),
            NodeTag::Global => self.enter_global(tree, state, node),
            NodeTag::Name => self.fold_constant_name(tree, node),
            NodeTag::AssignName | NodeTag::DelName => self.enter_bound_name(tree, state, node),
            NodeTag::AssignAttr | NodeTag::DelAttr => state.delayed.push_back(node),
            NodeTag::Import => self.enter_import(tree, node),
            NodeTag::ImportFrom => self.enter_import_from(tree, node),
            NodeTag::CompFor
            | NodeTag::Decorators
            | NodeTag::Assign
            | NodeTag::AugAssign
            | NodeTag::Delete
            | NodeTag::For
            | NodeTag::While
            | NodeTag::If
            | NodeTag::Try
            | NodeTag::ExceptHandler
            | NodeTag::Return
            | NodeTag::ExprStmt
            | NodeTag::Pass
            | NodeTag::Attribute
            | NodeTag::Subscript
            | NodeTag::Call
            | NodeTag::Keyword
            | NodeTag::Const
            | NodeTag::Tuple
            | NodeTag::List
            | NodeTag::Dict
            | NodeTag::BinOp
            | NodeTag::UnaryOp
            | NodeTag::Compare => {}
        }
    }

    fn leave(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let tag = tree.node(node).tag();
        match tag {
            NodeTag::ClassDef => self.leave_class(tree, state, node),
            NodeTag::FunctionDef => state.pop_global_scope(),
            NodeTag::Decorators => self.leave_decorators(tree, node),
            NodeTag::Assign => self.leave_assign(tree, state, node),
            NodeTag::Module
            | NodeTag::Lambda
            | NodeTag::GeneratorExp
            | NodeTag::ListComp
            | NodeTag::SetComp
            | NodeTag::DictComp
            | NodeTag::CompFor
            | NodeTag::Arguments
            | NodeTag::AugAssign
            | NodeTag::Delete
            | NodeTag::For
            | NodeTag::While
            | NodeTag::If
            | NodeTag::Try
            | NodeTag::ExceptHandler
            | NodeTag::Return
            | NodeTag::ExprStmt
            | NodeTag::Pass
            | NodeTag::Global
            | NodeTag::Import
            | NodeTag::ImportFrom
            | NodeTag::Name
            | NodeTag::AssignName
            | NodeTag::DelName
            | NodeTag::Attribute
            | NodeTag::AssignAttr
            | NodeTag::DelAttr
            | NodeTag::Subscript
            | NodeTag::Call
            | NodeTag::Keyword
            | NodeTag::Const
            | NodeTag::Tuple
            | NodeTag::List
            | NodeTag::Dict
            | NodeTag::BinOp
            | NodeTag::UnaryOp
            | NodeTag::Compare => {}
        }
    }

    // ------------------------------------------------------------------
    // Scope enters
    // ------------------------------------------------------------------

    fn enter_module(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let (name, path, doc, package) = match &tree.node(node).kind {
            NodeKind::Module {
                name,
                path,
                doc,
                package,
                ..
            } => (name.clone(), path.clone(), doc.clone(), *package),
            _ => return,
        };
        trace!(module = %name, "opening module scope");
        tree.open_frame(node);
        self.seed_constant(tree, node, "__name__", ConstValue::Str(name));
        self.seed_constant(tree, node, "__file__", ConstValue::Str(path.clone()));
        self.seed_constant(tree, node, "__doc__", doc_constant(doc));
        if package {
            let dir = path
                .rsplit_once('/')
                .map(|(dir, _)| dir.to_string())
                .unwrap_or_default();
            self.seed_constant(tree, node, "__path__", ConstValue::StrList(vec![dir]));
        }
    }

    fn enter_class(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let (name, doc) = match &tree.node(node).kind {
            NodeKind::ClassDef { name, doc, .. } => (name.clone(), doc.clone()),
            _ => return,
        };
        trace!(class = %name, "opening class scope");
        let scope = tree.frame_root(enclosing(tree, node));
        bind_in_frame(tree, scope, &name, node);
        tree.open_frame(node);
        let module = tree.module_name().to_string();
        self.seed_constant(tree, node, "__name__", ConstValue::Str(name));
        self.seed_constant(tree, node, "__module__", ConstValue::Str(module));
        self.seed_constant(tree, node, "__doc__", doc_constant(doc));
        state.push_metaclass();
    }

    fn enter_function(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let name = match &tree.node(node).kind {
            NodeKind::FunctionDef { name, .. } => name.clone(),
            _ => return,
        };
        trace!(function = %name, "opening function scope");
        state.push_global_scope();
        let scope = tree.frame_root(enclosing(tree, node));
        if tree.node(scope).tag() == NodeTag::ClassDef {
            let kind = if name == NEW_METHOD {
                MethodKind::ClassMethod
            } else {
                MethodKind::Method
            };
            set_method_kind(tree, node, kind);
        }
        bind_in_frame(tree, scope, &name, node);
        tree.open_frame(node);
    }

    /// Bind `*vararg` / `**kwarg` names; positional parameters are bound
    /// through the binding-context path when their name nodes are visited.
    fn enter_arguments(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let (vararg, kwarg) = match &tree.node(node).kind {
            NodeKind::Arguments { vararg, kwarg, .. } => (vararg.clone(), kwarg.clone()),
            _ => return,
        };
        let scope = tree.frame_root(enclosing(tree, node));
        if let Some(name) = vararg {
            bind_in_frame(tree, scope, &name, node);
        }
        if let Some(name) = kwarg {
            bind_in_frame(tree, scope, &name, node);
        }
    }

    // ------------------------------------------------------------------
    // Names and imports
    // ------------------------------------------------------------------

    fn enter_global(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let names = match &tree.node(node).kind {
            NodeKind::Global { names } => names.clone(),
            _ => return,
        };
        for name in names {
            state.declare_global(&name, node);
        }
    }

    /// Fold `True`/`False`/`None` name reads into constant nodes, in
    /// place. The node keeps its id; only its kind changes, once.
    fn fold_constant_name(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let value = match &tree.node(node).kind {
            NodeKind::Name { id } => match id.as_str() {
                "True" => ConstValue::Bool(true),
                "False" => ConstValue::Bool(false),
                "None" => ConstValue::None,
                _ => return,
            },
            _ => return,
        };
        tree.node_mut(node).kind = NodeKind::Const { value };
    }

    fn enter_bound_name(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        if state.assign_context.is_none() {
            return;
        }
        let name = match &tree.node(node).kind {
            NodeKind::AssignName { id } | NodeKind::DelName { id } => id.clone(),
            _ => return,
        };
        let scope = if state.is_declared_global(&name) {
            tree.root()
        } else {
            tree.frame_root(enclosing(tree, node))
        };
        bind_in_frame(tree, scope, &name, node);
    }

    /// `import a.b.c [as d]` binds `d`, or the top-level package name `a`.
    fn enter_import(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let names = match &tree.node(node).kind {
            NodeKind::Import { names } => names.clone(),
            _ => return,
        };
        let scope = tree.frame_root(enclosing(tree, node));
        for alias in names {
            let bound = alias.bound_name();
            let top = bound.split('.').next().unwrap_or(bound);
            bind_in_frame(tree, scope, top, node);
        }
    }

    fn enter_import_from(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let (module, names) = match &tree.node(node).kind {
            NodeKind::ImportFrom { module, names } => (module.clone(), names.clone()),
            _ => return,
        };
        let scope = tree.frame_root(enclosing(tree, node));
        for alias in names {
            if alias.name == "*" {
                match self.loader.load(&module) {
                    Ok(loaded) => {
                        for name in loaded.wildcard_exported_names() {
                            bind_in_frame(tree, scope, &name, node);
                        }
                    }
                    Err(err) => {
                        debug!(module = %module, error = %err, "wildcard import binds nothing");
                    }
                }
            } else {
                bind_in_frame(tree, scope, alias.bound_name(), node);
            }
        }
    }

    // ------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------

    fn leave_class(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let marker = state.pop_metaclass();
        let bases = match &tree.node(node).kind {
            NodeKind::ClassDef { bases, .. } => bases.clone(),
            _ => return,
        };
        let rendered: Vec<String> = bases
            .iter()
            .map(|base| self.renderer.render(tree, *base))
            .collect();
        if let NodeKind::ClassDef {
            newstyle,
            basenames,
            ..
        } = &mut tree.node_mut(node).kind
        {
            if bases.is_empty() {
                // No explicit bases: old or new style is decided by the
                // metaclass marker in effect for this nesting level.
                *newstyle = Some(marker == Metaclass::Type);
            }
            *basenames = rendered;
        }
    }

    /// A bare `classmethod`/`staticmethod` decorator overrides the default
    /// classification of the decorated function.
    fn leave_decorators(&mut self, tree: &mut SyntaxTree, node: NodeId) {
        let exprs = match &tree.node(node).kind {
            NodeKind::Decorators { exprs } => exprs.clone(),
            _ => return,
        };
        let parent = enclosing(tree, node);
        if tree.node(parent).tag() != NodeTag::FunctionDef {
            return;
        }
        for expr in exprs {
            if let NodeKind::Name { id } = &tree.node(expr).kind {
                let kind = if id == CLASSMETHOD {
                    Some(MethodKind::ClassMethod)
                } else if id == STATICMETHOD {
                    Some(MethodKind::StaticMethod)
                } else {
                    None
                };
                if let Some(kind) = kind {
                    set_method_kind(tree, parent, kind);
                }
            }
        }
    }

    fn leave_assign(&mut self, tree: &mut SyntaxTree, state: &mut WalkState, node: NodeId) {
        let (targets, value) = match &tree.node(node).kind {
            NodeKind::Assign { targets, value } => (targets.clone(), *value),
            _ => return,
        };
        let scope = tree.frame_root(enclosing(tree, node));
        let called = called_name(tree, value);
        if tree.node(scope).tag() == NodeTag::ClassDef && called.is_some() {
            // `name = classmethod(f)` / `name = staticmethod(f)` inside a
            // class body reclassifies the function already bound to each
            // target name.
            let kind = match called.as_deref() {
                Some(CLASSMETHOD) => MethodKind::ClassMethod,
                Some(STATICMETHOD) => MethodKind::StaticMethod,
                _ => return,
            };
            for target in targets {
                let name = match &tree.node(target).kind {
                    NodeKind::AssignName { id } => id.clone(),
                    _ => continue,
                };
                let first = tree
                    .frame(scope)
                    .and_then(|frame| frame.local(&name))
                    .and_then(|defs| defs.first().copied());
                if let Some(def) = first {
                    if tree.node(def).tag() == NodeTag::FunctionDef {
                        set_method_kind(tree, def, kind);
                    }
                }
            }
        } else if let [target] = targets[..] {
            let declares_metaclass = matches!(
                &tree.node(target).kind,
                NodeKind::AssignName { id } if id == METACLASS_ATTR
            );
            if declares_metaclass {
                // Structural approximation: the assigned expression is
                // never evaluated, the default metaclass token is recorded
                // no matter what the source actually names.
                state.set_metaclass(Metaclass::Type);
            }
        }
    }

    // ------------------------------------------------------------------
    // Shared plumbing
    // ------------------------------------------------------------------

    /// Create a synthetic constant node and register it as a pre-resolved
    /// binding in `scope`'s frame.
    fn seed_constant(
        &mut self,
        tree: &mut SyntaxTree,
        scope: NodeId,
        name: &str,
        value: ConstValue,
    ) {
        let line = tree.node(scope).line;
        let constant = tree.push(NodeKind::Const { value }, line);
        tree.node_mut(constant).parent = Some(scope);
        bind_in_frame(tree, scope, name, constant);
    }
}

fn doc_constant(doc: Option<String>) -> ConstValue {
    match doc {
        Some(text) => ConstValue::Str(text),
        None => ConstValue::None,
    }
}

/// The function name of `value` when it is a direct `name(...)` call.
fn called_name(tree: &SyntaxTree, value: NodeId) -> Option<String> {
    match &tree.node(value).kind {
        NodeKind::Call { func, .. } => match &tree.node(*func).kind {
            NodeKind::Name { id } => Some(id.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn set_method_kind(tree: &mut SyntaxTree, func: NodeId, kind: MethodKind) {
    if let NodeKind::FunctionDef { method_kind, .. } = &mut tree.node_mut(func).kind {
        *method_kind = kind;
    }
}

fn bind_in_frame(tree: &mut SyntaxTree, scope: NodeId, name: &str, def: NodeId) {
    match tree.frame_mut(scope) {
        Some(frame) => frame.add_local(name, def),
        None => panic!("node {} has no frame to bind '{}' in", scope, name),
    }
}

/// The parent of `node`, which the walk has necessarily assigned already.
///
/// # Panics
///
/// Panics if `node` has no parent: handlers only ever ask for the parent
/// of a non-root node after the walk has linked it.
fn enclosing(tree: &SyntaxTree, node: NodeId) -> NodeId {
    match tree.node(node).parent {
        Some(parent) => parent,
        None => panic!("node {} visited without a parent link", node),
    }
}
