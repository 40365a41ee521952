//! Arena-backed syntax tree for a Python-like language.
//!
//! This crate provides the data model shared by front-end parsers and the
//! scope binder:
//!
//! - **Nodes**: a closed [`NodeKind`] set stored in a [`SyntaxTree`] arena,
//!   addressed by stable [`NodeId`] indices. Parent references are plain
//!   indices, so the parent/child relationship carries no ownership cycle.
//! - **Frames**: scope-introducing nodes (module, class, function, lambda,
//!   comprehension) own a [`Frame`] holding the names bound in that scope,
//!   each mapped to the ordered list of nodes that define it.
//! - **Construction**: [`TreeBuilder`] assembles raw trees bottom-up. A raw
//!   tree carries kinds, children, and line numbers only; parent links,
//!   line-range info, and frames are filled in by a separate binding pass.
//!
//! # Quick Start
//!
//! ```
//! use treebind_ast::{ConstValue, TreeBuilder};
//!
//! let mut b = TreeBuilder::new("example", "example.py");
//! let target = b.assign_name("x", 1);
//! let value = b.const_value(ConstValue::Int(1), 1);
//! let assign = b.assign(vec![target], value, 1);
//! let tree = b.finish(vec![assign]);
//!
//! assert_eq!(tree.module_name(), "example");
//! ```

mod build;
mod frame;
mod node;
mod tree;

pub use build::TreeBuilder;
pub use frame::Frame;
pub use node::{ConstValue, ImportAlias, MethodKind, NodeId, NodeKind, NodeTag, SyntaxNode};
pub use tree::SyntaxTree;
