//! Error types and centralized error constructors for the evaluator.
//!
//! Every failure aborts the current `evaluate` call and reaches the caller
//! as an [`EvalError`]. Factory functions (e.g. `no_such_method()`) are the
//! construction API; match on [`EvalErrorKind`] to tell failures apart.

use std::fmt;

use osem_ir::BinaryOp;

use crate::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Type registration
    #[error("type `{name}` is already defined")]
    DuplicateType { name: String },
    #[error("type `{name}` derives from unknown base type `{base}`")]
    UnknownBase { name: String, base: String },
    #[error("field `{field}` of `{type_name}` redeclares a field inherited from `{base}`")]
    FieldShadow {
        type_name: String,
        field: String,
        base: String,
    },
    #[error("`{type_name}` declares `{member}` more than once")]
    DuplicateMember { type_name: String, member: String },
    #[error("function `{name}` is already defined")]
    DuplicateFunction { name: String },
    #[error("operator `{op}` is already overloaded for `{left}` and `{right}`")]
    DuplicateOperator {
        op: &'static str,
        left: String,
        right: String,
    },
    #[error("cannot overload operator `{op}` for `{left}` and `{right}`: {reason}")]
    InvalidOverload {
        op: &'static str,
        left: String,
        right: String,
        reason: &'static str,
    },
    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    // Dispatch
    #[error("no method '{method}' on type {type_name}")]
    NoSuchMethod { method: String, type_name: String },
    #[error("no field `{field}` on type {type_name}")]
    NoSuchField { field: String, type_name: String },
    #[error("{name} expects {expected} {}, got {got}", argument_word(*.expected))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("{context} needs addressable storage, but got a {found}")]
    NotAnLValue { context: String, found: &'static str },
    #[error("no operator `{op}` for `{left}` and `{right}`")]
    OperatorNotFound {
        op: &'static str,
        left: String,
        right: String,
    },

    // Access
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },
    #[error("undefined function: {name}")]
    UndefinedFunction { name: String },
    #[error("`self` used outside of a method")]
    SelfOutsideMethod,

    // Primitive evaluation
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },

    // Resource limits
    #[error("maximum recursion depth exceeded (limit: {depth})")]
    StackOverflow { depth: usize },
    #[error("call budget exceeded ({budget} calls)")]
    CallBudgetExceeded { budget: u32 },
}

fn argument_word(count: usize) -> &'static str {
    if count == 1 {
        "argument"
    } else {
        "arguments"
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function, method or constructor name.
    pub name: String,
}

/// Immutable snapshot of the call stack at an error site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    /// Create a backtrace from frames, most recent call first.
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {}", frame.name)?;
        }
        Ok(())
    }
}

/// Evaluation error reported to the external caller.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Call stack at the error site, when raised inside a call.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an error from a structured kind.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            backtrace: None,
        }
    }

    /// Attach a backtrace unless one is already present.
    ///
    /// The innermost call site captures first, and that snapshot is the
    /// complete one.
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() && !backtrace.is_empty() {
            self.backtrace = Some(backtrace);
        }
        self
    }
}

/// Non-local exit from evaluation.
///
/// `Return` unwinds to the nearest function, method or constructor
/// boundary. `Error` unwinds to the caller of `evaluate`.
#[derive(Debug)]
pub enum ControlAction {
    Error(Box<EvalError>),
    Return(Value),
}

impl ControlAction {
    /// Collapse at a body boundary: a `Return` becomes the body's value.
    pub fn into_result(self) -> EvalResult {
        match self {
            ControlAction::Error(err) => Err(*err),
            ControlAction::Return(value) => Ok(value),
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

/// Result of evaluating an expression inside a body.
pub type FlowResult = Result<Value, ControlAction>;

// Type Registration Errors

#[cold]
pub fn duplicate_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateType {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_base(name: &str, base: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownBase {
        name: name.to_string(),
        base: base.to_string(),
    })
}

#[cold]
pub fn field_shadow(type_name: &str, field: &str, base: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FieldShadow {
        type_name: type_name.to_string(),
        field: field.to_string(),
        base: base.to_string(),
    })
}

#[cold]
pub fn duplicate_member(type_name: &str, member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateMember {
        type_name: type_name.to_string(),
        member: member.to_string(),
    })
}

#[cold]
pub fn duplicate_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn duplicate_operator(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateOperator {
        op: op.as_symbol(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn invalid_overload(op: BinaryOp, left: &str, right: &str, reason: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOverload {
        op: op.as_symbol(),
        left: left.to_string(),
        right: right.to_string(),
        reason,
    })
}

#[cold]
pub fn unknown_type(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownType {
        name: name.to_string(),
    })
}

// Dispatch Errors

#[cold]
pub fn no_such_method(method: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMethod {
        method: method.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn no_such_field(field: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchField {
        field: field.to_string(),
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_an_lvalue(context: impl Into<String>, found: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnLValue {
        context: context.into(),
        found,
    })
}

#[cold]
pub fn operator_not_found(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::OperatorNotFound {
        op: op.as_symbol(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

// Access Errors

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn self_outside_method() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SelfOutsideMethod)
}

// Primitive Evaluation Errors

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow { operation })
}

// Resource Limit Errors

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn call_budget_exceeded(budget: u32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CallBudgetExceeded { budget })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arity_message_pluralizes() {
        assert_eq!(
            arity_mismatch("set", 1, 2).to_string(),
            "set expects 1 argument, got 2"
        );
        assert_eq!(
            arity_mismatch("Point", 2, 0).to_string(),
            "Point expects 2 arguments, got 0"
        );
    }

    #[test]
    fn test_operator_not_found_message() {
        let err = operator_not_found(BinaryOp::Add, "Point", "Helper");
        assert_eq!(err.to_string(), "no operator `+` for `Point` and `Helper`");
    }

    #[test]
    fn test_backtrace_display() {
        let bt = EvalBacktrace::new(vec![
            BacktraceFrame {
                name: "Helper.set".to_string(),
            },
            BacktraceFrame {
                name: "main".to_string(),
            },
        ]);
        assert_eq!(
            bt.to_string(),
            "stack backtrace:\n  0: Helper.set\n  1: main\n"
        );
    }

    #[test]
    fn test_with_backtrace_keeps_innermost() {
        let inner = EvalBacktrace::new(vec![BacktraceFrame {
            name: "inner".to_string(),
        }]);
        let outer = EvalBacktrace::new(vec![BacktraceFrame {
            name: "outer".to_string(),
        }]);
        let err = division_by_zero()
            .with_backtrace(inner.clone())
            .with_backtrace(outer);
        assert_eq!(err.backtrace, Some(inner));
    }

    #[test]
    fn test_return_converts_to_value() {
        let action = ControlAction::Return(Value::Int(3));
        assert_eq!(action.into_result(), Ok(Value::Int(3)));
    }
}
