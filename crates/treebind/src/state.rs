//! Per-walk mutable state.
//!
//! One [`WalkState`] exists for the duration of a single bind and is
//! threaded through every traversal call by parameter; nothing here is
//! process-wide. The two stacks are pushed and popped strictly in pairs by
//! the scope enter/leave handlers, so they return to their initial depth
//! when the walk returns to the root.

use std::collections::{HashMap, VecDeque};

use treebind_ast::NodeId;

/// Marker for the metaclass governing the classes at the current nesting
/// level. Only the structural token is tracked, never an evaluated value:
/// a `__metaclass__` assignment records [`Metaclass::Type`] regardless of
/// what was actually assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metaclass {
    /// No metaclass declaration in effect.
    Unset,
    /// The built-in default metaclass.
    Type,
}

/// The mutable context of one walk.
#[derive(Debug)]
pub(crate) struct WalkState {
    /// The deletion/assignment statement governing the child currently
    /// being visited, if that child is one of its binding targets.
    pub assign_context: Option<NodeId>,
    /// One map per active function: names declared `global`, each with the
    /// declaring statements.
    global_names: Vec<HashMap<String, Vec<NodeId>>>,
    /// One marker per active class nesting level; the base entry covers
    /// module level.
    metaclass: Vec<Metaclass>,
    /// Attribute-assignment targets awaiting the deferred pass, in
    /// discovery order.
    pub delayed: VecDeque<NodeId>,
}

impl WalkState {
    pub fn new() -> Self {
        WalkState {
            assign_context: None,
            global_names: Vec::new(),
            metaclass: vec![Metaclass::Unset],
            delayed: VecDeque::new(),
        }
    }

    /// Enter a function: start an empty global-declaration map.
    pub fn push_global_scope(&mut self) {
        self.global_names.push(HashMap::new());
    }

    /// Leave a function: drop its global-declaration map.
    ///
    /// # Panics
    ///
    /// Panics on underflow, which would mean unbalanced enter/leave calls.
    pub fn pop_global_scope(&mut self) {
        assert!(
            self.global_names.pop().is_some(),
            "global-declaration stack underflow"
        );
    }

    /// Record a `global name` declaration in the innermost function.
    /// No effect at module level.
    pub fn declare_global(&mut self, name: &str, stmt: NodeId) {
        if let Some(top) = self.global_names.last_mut() {
            top.entry(name.to_string()).or_default().push(stmt);
        }
    }

    /// Whether `name` is declared global in the innermost active function.
    pub fn is_declared_global(&self, name: &str) -> bool {
        self.global_names
            .last()
            .is_some_and(|top| top.contains_key(name))
    }

    /// Enter a class: the inner nesting level starts with the enclosing
    /// marker.
    pub fn push_metaclass(&mut self) {
        let top = self.current_metaclass();
        self.metaclass.push(top);
    }

    /// Leave a class, returning the marker in effect for it.
    ///
    /// # Panics
    ///
    /// Panics if the base entry would be popped, which would mean
    /// unbalanced enter/leave calls.
    pub fn pop_metaclass(&mut self) -> Metaclass {
        assert!(self.metaclass.len() > 1, "metaclass stack underflow");
        self.metaclass.pop().unwrap_or(Metaclass::Unset)
    }

    /// Overwrite the marker at the current nesting level.
    pub fn set_metaclass(&mut self, marker: Metaclass) {
        if let Some(top) = self.metaclass.last_mut() {
            *top = marker;
        }
    }

    fn current_metaclass(&self) -> Metaclass {
        self.metaclass.last().copied().unwrap_or(Metaclass::Unset)
    }

    /// Hand the deferred queue off for resolution, leaving it empty.
    pub fn take_delayed(&mut self) -> VecDeque<NodeId> {
        std::mem::take(&mut self.delayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(index: u32) -> NodeId {
        // NodeId construction is crate-private to the ast crate; tests here
        // only need distinct ids, so borrow them from a scratch builder.
        let mut b = treebind_ast::TreeBuilder::new("m", "m.py");
        let mut id = b.pass_stmt(1);
        for _ in 0..index {
            id = b.pass_stmt(1);
        }
        id
    }

    #[test]
    fn global_declarations_scope_to_innermost_function() {
        let mut state = WalkState::new();
        let stmt = node(0);

        // module level: ignored
        state.declare_global("x", stmt);
        assert!(!state.is_declared_global("x"));

        state.push_global_scope();
        state.declare_global("x", stmt);
        assert!(state.is_declared_global("x"));

        state.push_global_scope();
        assert!(!state.is_declared_global("x"));
        state.pop_global_scope();

        assert!(state.is_declared_global("x"));
        state.pop_global_scope();
    }

    #[test]
    fn metaclass_markers_inherit_and_unwind() {
        let mut state = WalkState::new();
        state.set_metaclass(Metaclass::Type);

        state.push_metaclass();
        assert_eq!(state.current_metaclass(), Metaclass::Type);

        state.push_metaclass();
        state.set_metaclass(Metaclass::Unset);
        assert_eq!(state.pop_metaclass(), Metaclass::Unset);

        assert_eq!(state.pop_metaclass(), Metaclass::Type);
        assert_eq!(state.current_metaclass(), Metaclass::Type);
    }

    #[test]
    #[should_panic(expected = "metaclass stack underflow")]
    fn base_metaclass_entry_cannot_pop() {
        let mut state = WalkState::new();
        state.pop_metaclass();
    }

    #[test]
    fn delayed_queue_drains_fifo() {
        let mut state = WalkState::new();
        let first = node(0);
        let second = node(1);
        state.delayed.push_back(first);
        state.delayed.push_back(second);

        let mut queue = state.take_delayed();
        assert_eq!(queue.pop_front(), Some(first));
        assert_eq!(queue.pop_front(), Some(second));
        assert!(state.delayed.is_empty());
    }
}
