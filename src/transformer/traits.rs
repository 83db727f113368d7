//! Core trait for AST rewrites.

use crate::ast::Script;

/// A rewrite over a parsed script.
pub trait Rewrite: Send + Sync {
    fn id(&self) -> &'static str;

    /// Rewrite `script` in place and return how many nodes changed.
    fn apply(&self, script: &mut Script) -> usize;
}
