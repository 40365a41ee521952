//! Error types for the recoverable collaborator failures.
//!
//! Both errors here are caught at the smallest possible granularity and
//! never propagate past their origin: a failed module load costs the
//! bindings of one wildcard import, a failed inference costs the
//! registration of one deferred attribute node. Anything else that goes
//! wrong during binding (a node visited without a parent, a binding outside
//! any frame) is a contract violation by the tree producer and panics.

use thiserror::Error;

/// A module could not be loaded for wildcard-import expansion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load module '{module}': {reason}")]
pub struct ModuleLoadError {
    /// The module that was requested.
    pub module: String,
    /// Loader-supplied description of the failure.
    pub reason: String,
}

impl ModuleLoadError {
    /// Create a load error for `module`.
    pub fn new(module: impl Into<String>, reason: impl Into<String>) -> Self {
        ModuleLoadError {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// The inference collaborator gave up on an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("inference failed: {reason}")]
pub struct InferenceError {
    /// Engine-supplied description of the failure.
    pub reason: String,
}

impl InferenceError {
    /// Create an inference error.
    pub fn new(reason: impl Into<String>) -> Self {
        InferenceError {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_load_error_display() {
        let err = ModuleLoadError::new("os.path", "not on the load path");
        assert_eq!(
            err.to_string(),
            "failed to load module 'os.path': not on the load path"
        );
    }

    #[test]
    fn inference_error_display() {
        let err = InferenceError::new("too dynamic");
        assert_eq!(err.to_string(), "inference failed: too dynamic");
    }
}
