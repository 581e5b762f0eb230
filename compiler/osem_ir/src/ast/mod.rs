//! AST node types.

mod expr;
mod items;
mod operators;

pub use expr::ExprKind;
pub use items::{
    ConstructorDef, FieldDef, FunctionDef, MethodDef, OperatorFnDef, OperatorMethodDef, Param,
    ParamMode, Program, TypeDef, TypeTag,
};
pub use operators::BinaryOp;
