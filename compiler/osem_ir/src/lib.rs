//! Osem IR - expression and declaration types for the osem engine.
//!
//! This crate contains the data the engine evaluates:
//! - Names for interned identifiers
//! - A flat expression arena (`ExprId` indices instead of boxed trees)
//! - Record type, function, method and operator-overload declarations
//!
//! Parsing is not part of this crate. Callers build a [`Program`] directly,
//! allocating expressions in its [`ExprArena`].

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;

pub use arena::ExprArena;
pub use ast::{
    BinaryOp, ConstructorDef, ExprKind, FieldDef, FunctionDef, MethodDef, OperatorFnDef,
    OperatorMethodDef, Param, ParamMode, Program, TypeDef, TypeTag,
};
pub use expr_id::{ExprId, ExprRange};
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
