//! Osem Eval - evaluation engine for record types with value and alias
//! parameters, operator overloading and single inheritance.
//!
//! # Architecture
//!
//! - `Value`: numbers, booleans, unit and records with inline fields
//! - `TypeRegistry`: record types, field layouts and base-chain method lookup
//! - `Environment`: slot storage with value and alias bindings
//! - `OperatorTable`: user overloads keyed by operator and operand type tags
//! - `Interpreter`: tree-walking evaluator over an `osem_ir` program
//!
//! # Entry point
//!
//! [`evaluate`] registers a [`Program`]'s declarations and evaluates its
//! top-level expression. [`InterpreterBuilder`] gives finer control over
//! the mode and the initial bindings.

mod diagnostics;
mod environment;
pub mod errors;
mod eval_mode;
pub mod interpreter;
mod operators;
mod registry;
mod stack;
mod value;

pub use diagnostics::{CallFrame, CallStack};
pub use environment::{AccessError, Binding, Environment, Place, SlotId, Store};
pub use errors::{
    BacktraceFrame, ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalResult,
    FlowResult,
};
pub use eval_mode::{EvalMode, ModeState};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter};
pub use operators::{evaluate_primitive, OperatorKey, OperatorTable, Overload};
pub use registry::{
    BaseChain, FunctionRegistry, ResolvedConstructor, ResolvedMethod, TypeInfo, TypeRegistry,
};
pub use stack::ensure_sufficient_stack;
pub use value::{tag_name, RecordValue, SharedLayout, StructLayout, Value, ValueDisplay};

use osem_ir::{Name, Program, StringInterner};

/// Evaluate `program` in the default mode.
///
/// `initial_bindings` become globals, visible from every frame. Type,
/// function and operator registration errors are reported before any
/// expression is evaluated.
pub fn evaluate(
    program: &Program,
    interner: &StringInterner,
    initial_bindings: impl IntoIterator<Item = (Name, Value)>,
) -> EvalResult {
    evaluate_with_mode(program, interner, initial_bindings, EvalMode::default())
}

/// Evaluate `program` under an explicit [`EvalMode`].
#[tracing::instrument(level = "debug", skip_all, fields(mode = ?mode))]
pub fn evaluate_with_mode(
    program: &Program,
    interner: &StringInterner,
    initial_bindings: impl IntoIterator<Item = (Name, Value)>,
    mode: EvalMode,
) -> EvalResult {
    InterpreterBuilder::new(program, interner)
        .mode(mode)
        .bindings(initial_bindings)
        .build()?
        .run()
}

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
