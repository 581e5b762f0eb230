//! Expression nodes.
//!
//! Statements are expressions too: `Let`, `Assign` and `Return` evaluate to
//! a value like everything else, and a `Block` sequences them.

use crate::{BinaryOp, ExprId, ExprRange, Name};

/// Expression kinds stored in the [`ExprArena`](crate::ExprArena).
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// The unit value.
    Unit,

    /// Variable reference (local, global, or implicit `self` field).
    Ident(Name),
    /// The receiver inside a method or constructor body.
    SelfRef,
    /// Field access: `receiver.field`.
    Field { receiver: ExprId, field: Name },

    /// Binary operation: `left op right`.
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Assignment to an addressable target: `target = value`.
    Assign { target: ExprId, value: ExprId },
    /// Local declaration: `let name = init`.
    Let { name: Name, init: ExprId },

    /// Record construction: `Type(args)`.
    Construct { type_name: Name, args: ExprRange },
    /// Free function call, or an implicit `self` method call inside a method.
    Call { func: Name, args: ExprRange },
    /// Method call: `receiver.method(args)`.
    MethodCall {
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    },

    /// Statement sequence with an optional trailing value.
    Block {
        stmts: ExprRange,
        result: Option<ExprId>,
    },
    /// Conditional.
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    /// Early return from the enclosing body.
    Return(Option<ExprId>),
}

impl ExprKind {
    /// Short human-readable description, used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Bool(_) | ExprKind::Unit => {
                "literal"
            }
            ExprKind::Ident(_) => "variable",
            ExprKind::SelfRef => "self",
            ExprKind::Field { .. } => "field access",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Assign { .. } => "assignment",
            ExprKind::Let { .. } => "declaration",
            ExprKind::Construct { .. } => "construction",
            ExprKind::Call { .. } => "call",
            ExprKind::MethodCall { .. } => "method call",
            ExprKind::Block { .. } => "block",
            ExprKind::If { .. } => "conditional",
            ExprKind::Return(_) => "return",
        }
    }
}
