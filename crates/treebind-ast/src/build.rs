//! Bottom-up construction of raw syntax trees.
//!
//! A front end (parser, test fixture, synthetic-module generator) creates
//! leaf nodes first, then the statements that reference them, and finally
//! seals the module with [`TreeBuilder::finish`]. The resulting tree is
//! *raw*: parents, line ranges, and frames are absent until a binding pass
//! runs over it.

use crate::node::{ConstValue, ImportAlias, MethodKind, NodeId, NodeKind, SyntaxNode};
use crate::tree::SyntaxTree;

/// Builder for a raw [`SyntaxTree`].
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
    module_name: String,
    module_path: String,
    module_doc: Option<String>,
    package: bool,
}

impl TreeBuilder {
    /// Start a module named `name`, loaded from `path`.
    pub fn new(name: &str, path: &str) -> Self {
        TreeBuilder {
            nodes: Vec::new(),
            module_name: name.to_string(),
            module_path: path.to_string(),
            module_doc: None,
            package: false,
        }
    }

    /// Set the module docstring.
    pub fn doc(mut self, text: &str) -> Self {
        self.module_doc = Some(text.to_string());
        self
    }

    /// Mark the module as a package `__init__`.
    pub fn package(mut self) -> Self {
        self.package = true;
        self
    }

    /// Seal the module with `body` as its statements and return the tree.
    pub fn finish(mut self, body: Vec<NodeId>) -> SyntaxTree {
        let kind = NodeKind::Module {
            name: self.module_name,
            path: self.module_path,
            doc: self.module_doc,
            package: self.package,
            body,
        };
        let root = NodeId::new(self.nodes.len());
        self.nodes.push(SyntaxNode::new(kind, 1));
        SyntaxTree::from_parts(self.nodes, root)
    }

    fn push(&mut self, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(SyntaxNode::new(kind, line));
        id
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// A name read.
    pub fn name(&mut self, id: &str, line: u32) -> NodeId {
        self.push(NodeKind::Name { id: id.to_string() }, line)
    }

    /// A name in binding position.
    pub fn assign_name(&mut self, id: &str, line: u32) -> NodeId {
        self.push(NodeKind::AssignName { id: id.to_string() }, line)
    }

    /// A name in deletion position.
    pub fn del_name(&mut self, id: &str, line: u32) -> NodeId {
        self.push(NodeKind::DelName { id: id.to_string() }, line)
    }

    /// A constant literal.
    pub fn const_value(&mut self, value: ConstValue, line: u32) -> NodeId {
        self.push(NodeKind::Const { value }, line)
    }

    /// An integer literal.
    pub fn int(&mut self, value: i64, line: u32) -> NodeId {
        self.const_value(ConstValue::Int(value), line)
    }

    /// A string literal.
    pub fn str_lit(&mut self, value: &str, line: u32) -> NodeId {
        self.const_value(ConstValue::Str(value.to_string()), line)
    }

    /// An attribute read `value.attr`.
    pub fn attribute(&mut self, value: NodeId, attr: &str, line: u32) -> NodeId {
        self.push(
            NodeKind::Attribute {
                value,
                attr: attr.to_string(),
            },
            line,
        )
    }

    /// An attribute in assignment position `value.attr = ...`.
    pub fn assign_attr(&mut self, value: NodeId, attr: &str, line: u32) -> NodeId {
        self.push(
            NodeKind::AssignAttr {
                value,
                attr: attr.to_string(),
            },
            line,
        )
    }

    /// An attribute in deletion position `del value.attr`.
    pub fn del_attr(&mut self, value: NodeId, attr: &str, line: u32) -> NodeId {
        self.push(
            NodeKind::DelAttr {
                value,
                attr: attr.to_string(),
            },
            line,
        )
    }

    /// A subscript `value[index]`.
    pub fn subscript(&mut self, value: NodeId, index: NodeId, line: u32) -> NodeId {
        self.push(NodeKind::Subscript { value, index }, line)
    }

    /// A call expression.
    pub fn call(&mut self, func: NodeId, args: Vec<NodeId>, line: u32) -> NodeId {
        self.push(
            NodeKind::Call {
                func,
                args,
                keywords: Vec::new(),
            },
            line,
        )
    }

    /// A call expression with keyword arguments.
    pub fn call_with_keywords(
        &mut self,
        func: NodeId,
        args: Vec<NodeId>,
        keywords: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::Call {
                func,
                args,
                keywords,
            },
            line,
        )
    }

    /// One `name=value` keyword argument.
    pub fn keyword(&mut self, arg: &str, value: NodeId, line: u32) -> NodeId {
        self.push(
            NodeKind::Keyword {
                arg: arg.to_string(),
                value,
            },
            line,
        )
    }

    /// A tuple display.
    pub fn tuple(&mut self, elements: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::Tuple { elements }, line)
    }

    /// A list display.
    pub fn list(&mut self, elements: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::List { elements }, line)
    }

    /// A dict display; `keys` and `values` must be parallel.
    pub fn dict(&mut self, keys: Vec<NodeId>, values: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::Dict { keys, values }, line)
    }

    /// A binary operation.
    pub fn bin_op(&mut self, left: NodeId, op: &str, right: NodeId, line: u32) -> NodeId {
        self.push(
            NodeKind::BinOp {
                left,
                op: op.to_string(),
                right,
            },
            line,
        )
    }

    /// A unary operation.
    pub fn unary_op(&mut self, op: &str, operand: NodeId, line: u32) -> NodeId {
        self.push(
            NodeKind::UnaryOp {
                op: op.to_string(),
                operand,
            },
            line,
        )
    }

    /// A comparison chain; `ops` and `comparators` must be parallel.
    pub fn compare(
        &mut self,
        left: NodeId,
        ops: Vec<&str>,
        comparators: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::Compare {
                left,
                ops: ops.into_iter().map(str::to_string).collect(),
                comparators,
            },
            line,
        )
    }

    /// A lambda expression.
    pub fn lambda(&mut self, args: NodeId, body: NodeId, line: u32) -> NodeId {
        self.push(NodeKind::Lambda { args, body }, line)
    }

    /// A generator expression.
    pub fn generator_exp(&mut self, element: NodeId, generators: Vec<NodeId>, line: u32) -> NodeId {
        self.push(
            NodeKind::GeneratorExp {
                element,
                generators,
            },
            line,
        )
    }

    /// A list comprehension.
    pub fn list_comp(&mut self, element: NodeId, generators: Vec<NodeId>, line: u32) -> NodeId {
        self.push(
            NodeKind::ListComp {
                element,
                generators,
            },
            line,
        )
    }

    /// A set comprehension.
    pub fn set_comp(&mut self, element: NodeId, generators: Vec<NodeId>, line: u32) -> NodeId {
        self.push(
            NodeKind::SetComp {
                element,
                generators,
            },
            line,
        )
    }

    /// A dict comprehension.
    pub fn dict_comp(
        &mut self,
        key: NodeId,
        value: NodeId,
        generators: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::DictComp {
                key,
                value,
                generators,
            },
            line,
        )
    }

    /// One `for target in iter [if ...]` comprehension clause.
    pub fn comp_for(&mut self, target: NodeId, iter: NodeId, ifs: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::CompFor { target, iter, ifs }, line)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// A plain assignment.
    pub fn assign(&mut self, targets: Vec<NodeId>, value: NodeId, line: u32) -> NodeId {
        self.push(NodeKind::Assign { targets, value }, line)
    }

    /// An augmented assignment.
    pub fn aug_assign(&mut self, target: NodeId, op: &str, value: NodeId, line: u32) -> NodeId {
        self.push(
            NodeKind::AugAssign {
                target,
                op: op.to_string(),
                value,
            },
            line,
        )
    }

    /// A `del` statement.
    pub fn delete(&mut self, targets: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::Delete { targets }, line)
    }

    /// An expression statement.
    pub fn expr_stmt(&mut self, value: NodeId, line: u32) -> NodeId {
        self.push(NodeKind::ExprStmt { value }, line)
    }

    /// A `return` statement.
    pub fn return_stmt(&mut self, value: Option<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::Return { value }, line)
    }

    /// A `pass` statement.
    pub fn pass_stmt(&mut self, line: u32) -> NodeId {
        self.push(NodeKind::Pass, line)
    }

    /// A `global` declaration.
    pub fn global_stmt(&mut self, names: Vec<&str>, line: u32) -> NodeId {
        self.push(
            NodeKind::Global {
                names: names.into_iter().map(str::to_string).collect(),
            },
            line,
        )
    }

    /// A plain `import` statement.
    pub fn import(&mut self, names: Vec<ImportAlias>, line: u32) -> NodeId {
        self.push(NodeKind::Import { names }, line)
    }

    /// A `from module import ...` statement.
    pub fn import_from(&mut self, module: &str, names: Vec<ImportAlias>, line: u32) -> NodeId {
        self.push(
            NodeKind::ImportFrom {
                module: module.to_string(),
                names,
            },
            line,
        )
    }

    /// A `for` loop.
    pub fn for_stmt(
        &mut self,
        target: NodeId,
        iter: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
            },
            line,
        )
    }

    /// A `while` loop.
    pub fn while_stmt(
        &mut self,
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(NodeKind::While { test, body, orelse }, line)
    }

    /// An `if` statement.
    pub fn if_stmt(
        &mut self,
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(NodeKind::If { test, body, orelse }, line)
    }

    /// A `try` statement.
    pub fn try_stmt(
        &mut self,
        body: Vec<NodeId>,
        handlers: Vec<NodeId>,
        orelse: Vec<NodeId>,
        finalbody: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            line,
        )
    }

    /// One `except` clause.
    pub fn except_handler(
        &mut self,
        etype: Option<NodeId>,
        name: Option<NodeId>,
        body: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(NodeKind::ExceptHandler { etype, name, body }, line)
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    /// A parameter list.
    pub fn arguments(
        &mut self,
        args: Vec<NodeId>,
        defaults: Vec<NodeId>,
        vararg: Option<&str>,
        kwarg: Option<&str>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::Arguments {
                args,
                defaults,
                vararg: vararg.map(str::to_string),
                kwarg: kwarg.map(str::to_string),
            },
            line,
        )
    }

    /// A function definition with no decorators and no docstring.
    pub fn function_def(
        &mut self,
        name: &str,
        args: NodeId,
        body: Vec<NodeId>,
        line: u32,
    ) -> NodeId {
        self.push(
            NodeKind::FunctionDef {
                name: name.to_string(),
                doc: None,
                decorators: None,
                args,
                body,
                method_kind: MethodKind::Function,
            },
            line,
        )
    }

    /// A class definition with no decorators and no docstring.
    pub fn class_def(&mut self, name: &str, bases: Vec<NodeId>, body: Vec<NodeId>, line: u32) -> NodeId {
        self.push(
            NodeKind::ClassDef {
                name: name.to_string(),
                doc: None,
                decorators: None,
                bases,
                body,
                newstyle: None,
                basenames: Vec::new(),
            },
            line,
        )
    }

    /// A decorator list.
    pub fn decorators(&mut self, exprs: Vec<NodeId>, line: u32) -> NodeId {
        self.push(NodeKind::Decorators { exprs }, line)
    }

    /// Attach a decorator list to a previously built function or class.
    ///
    /// # Panics
    ///
    /// Panics if `def` is not a function or class definition.
    pub fn decorate(&mut self, def: NodeId, decorator_list: NodeId) {
        match &mut self.nodes[def.index()].kind {
            NodeKind::FunctionDef { decorators, .. } | NodeKind::ClassDef { decorators, .. } => {
                *decorators = Some(decorator_list);
            }
            other => panic!("cannot decorate a {} node", other.tag()),
        }
    }

    /// Set the docstring of a previously built function or class.
    ///
    /// # Panics
    ///
    /// Panics if `def` is not a function or class definition.
    pub fn set_doc(&mut self, def: NodeId, text: &str) {
        match &mut self.nodes[def.index()].kind {
            NodeKind::FunctionDef { doc, .. } | NodeKind::ClassDef { doc, .. } => {
                *doc = Some(text.to_string());
            }
            other => panic!("cannot set a docstring on a {} node", other.tag()),
        }
    }
}
