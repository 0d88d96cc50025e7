//! Per-run session context
//!
//! The original tool kept the chosen backend and the debug flag in global
//! mutable state. Here they live in one [`SessionContext`] value constructed
//! once by the caller and passed explicitly into the parser and the
//! reconciliation engine. No process-wide singletons.

use crate::backends::Backend;

/// Options for one extraction/reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    /// The backend whose output grammar applies to this run
    pub backend: Backend,
    /// Echo every raw backend line at debug level
    pub debug: bool,
}

impl SessionContext {
    /// Create a context for the given backend with debug echo disabled
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            debug: false,
        }
    }

    /// Enable or disable raw-line debug echo
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
