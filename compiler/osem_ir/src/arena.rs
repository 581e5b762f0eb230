//! Flat expression arena.
//!
//! Expressions reference each other by [`ExprId`]; lists of expressions
//! (arguments, block statements) are stored contiguously and referenced by
//! [`ExprRange`].

use crate::{ExprId, ExprKind, ExprRange};

/// Convert an arena length to a `u32` index.
///
/// # Panics
/// Panics if the arena holds more than `u32::MAX` entries.
#[inline]
pub(crate) fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len}"))
}

/// Arena for expressions.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<ExprKind>,
    expr_lists: Vec<ExprId>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression, returning its ID.
    pub fn alloc(&mut self, kind: ExprKind) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(kind);
        id
    }

    /// Allocate a contiguous list of expression IDs.
    pub fn alloc_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expression list entries");
        self.expr_lists.extend(ids);
        let len = to_u32(self.expr_lists.len(), "expression list entries") - start;
        ExprRange::new(start, len)
    }

    /// Get an expression by ID.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()]
    }

    /// Get the IDs in a range.
    #[inline]
    pub fn list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        &self.expr_lists[start..start + range.len()]
    }

    /// Number of allocated expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}
