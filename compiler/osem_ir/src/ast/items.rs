//! Declaration items: record types, functions, methods and operator overloads.

use crate::{BinaryOp, ExprArena, ExprId, Name};

/// Runtime type identifier.
///
/// Carried by every value and used as the operand key for operator
/// overloads. Records are identified by their declared type name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    Unit,
    Record(Name),
}

impl TypeTag {
    /// Whether this tag names a primitive number.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, TypeTag::Int | TypeTag::Float)
    }
}

/// How an argument is bound to a parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ParamMode {
    /// The parameter receives a copy; mutations stay local to the call.
    #[default]
    Value,
    /// The parameter refers to the caller's storage; mutations are visible
    /// to the caller.
    Alias,
}

/// A declared parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub mode: ParamMode,
}

impl Param {
    pub const fn value(name: Name) -> Self {
        Param {
            name,
            mode: ParamMode::Value,
        }
    }

    pub const fn alias(name: Name) -> Self {
        Param {
            name,
            mode: ParamMode::Alias,
        }
    }
}

/// A free function or a method.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Vec<Param>,
    pub body: ExprId,
}

/// Methods share the function shape; `self` is bound implicitly.
pub type MethodDef = FunctionDef;

/// A record field with an optional default initializer.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    pub name: Name,
    pub default: Option<ExprId>,
}

/// A user-written constructor body, run with `self` bound to the fresh record.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstructorDef {
    pub params: Vec<Param>,
    pub body: ExprId,
}

/// Operator overload declared on a record type.
///
/// The owning type is the left operand; `param` receives the right operand.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorMethodDef {
    pub op: BinaryOp,
    pub right: TypeTag,
    pub param: Param,
    pub body: ExprId,
}

/// Free-standing operator overload taking both operands as parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorFnDef {
    pub op: BinaryOp,
    pub left: TypeTag,
    pub right: TypeTag,
    pub params: [Param; 2],
    pub body: ExprId,
}

/// A record type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDef {
    pub name: Name,
    /// Single optional base type, referenced by name.
    pub base: Option<Name>,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
    pub constructor: Option<ConstructorDef>,
    pub operators: Vec<OperatorMethodDef>,
}

impl TypeDef {
    /// A type with no members and no base.
    pub fn new(name: Name) -> Self {
        TypeDef {
            name,
            base: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructor: None,
            operators: Vec::new(),
        }
    }
}

/// A complete program handed to the engine.
///
/// Types are registered in declaration order, so a base type must be listed
/// before the types deriving from it.
#[derive(Clone, Debug)]
pub struct Program {
    pub arena: ExprArena,
    pub types: Vec<TypeDef>,
    pub functions: Vec<FunctionDef>,
    pub operators: Vec<OperatorFnDef>,
    pub body: ExprId,
}
