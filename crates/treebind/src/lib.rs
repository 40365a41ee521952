//! Scope binding for Python-like syntax trees.
//!
//! This crate turns a raw syntax tree (see `treebind-ast`) into a semantic
//! tree in two strictly ordered phases:
//!
//! 1. **The walk**: a single recursive pre-order pass that assigns parent
//!    links and line ranges, opens a frame on every scope-introducing node
//!    (module, class, function, lambda, comprehension), and registers each
//!    bound name in the frame that owns it. Along the way it classifies
//!    methods, tracks `global` declarations and metaclass markers, folds
//!    `True`/`False`/`None` reads into constants, and queues attribute
//!    assignments it cannot place yet.
//! 2. **The deferred pass**: drains that queue once the walk has returned
//!    to the root, asking the host's [`InferenceEngine`] which entities an
//!    attribute owner may be, and registering the assignment in the right
//!    locals or instance-attributes table.
//!
//! The result is a static approximation of the language's dynamic binding
//! rules: no code is executed, conditional definitions are all recorded,
//! and attribute sets are best-effort rather than sound.
//!
//! # Quick Start
//!
//! ```
//! use treebind::{bind, NullInference, NullLoader, SimpleRenderer};
//! use treebind_ast::{ConstValue, TreeBuilder};
//!
//! // x = 1
//! let mut b = TreeBuilder::new("demo", "demo.py");
//! let target = b.assign_name("x", 1);
//! let value = b.const_value(ConstValue::Int(1), 1);
//! let assign = b.assign(vec![target], value, 1);
//! let mut tree = b.finish(vec![assign]);
//!
//! bind(&mut tree, &mut NullLoader, &NullInference, &SimpleRenderer);
//!
//! let module = tree.root();
//! assert_eq!(tree.frame(module).unwrap().local("x"), Some(&[target][..]));
//! ```
//!
//! # Collaborators
//!
//! Module loading, type inference, and source rendering are host concerns,
//! reached through the traits in [`adapter`]. Their failures are recoverable
//! at the smallest granularity (one wildcard import, one queued attribute
//! node) and never abort the bind; see [`error`].

// ============================================================================
// Modules and re-exports
// ============================================================================

/// Collaborator traits and their inert defaults.
pub mod adapter;
pub use adapter::{
    Candidates, Inferred, InferenceEngine, LoadedModule, ModuleLoader, NullInference, NullLoader,
    SimpleRenderer, SourceRenderer,
};

/// Recoverable collaborator failures.
pub mod error;
pub use error::{InferenceError, ModuleLoadError};

/// Frame summaries for JSON consumers.
pub mod report;
pub use report::{summarize, FrameSummary};

mod delayed;
mod state;
mod walk;
pub use walk::Binder;

use treebind_ast::SyntaxTree;

/// Bind `tree` in place with the given collaborators.
///
/// Convenience wrapper over [`Binder::new`] + [`Binder::bind`].
///
/// # Panics
///
/// Panics if the tree violates its structural contract (e.g. it is not
/// rooted at a module).
pub fn bind(
    tree: &mut SyntaxTree,
    loader: &mut dyn ModuleLoader,
    inference: &dyn InferenceEngine,
    renderer: &dyn SourceRenderer,
) {
    Binder::new(loader, inference, renderer).bind(tree);
}
