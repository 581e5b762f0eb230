//! Tree-walking interpreter.
//!
//! # Architecture
//!
//! All evaluation goes through [`Interpreter::eval`], which dispatches on
//! the expression kind. Helper modules hold the pieces that touch more than
//! one subsystem:
//!
//! - `place` - addressable storage for assignment and alias arguments
//! - `call` - argument binding, function and method dispatch
//! - `construct` - record construction and constructor bodies
//! - `binary` - operator resolution and overload invocation
//! - `scope_guard` - RAII scope and frame cleanup
//!
//! # Storage
//!
//! Every binding lives in the [`Environment`]. Calls never copy values back
//! on return: an alias parameter holds a place in the caller's storage, so
//! each write through it is already visible to the caller.

mod binary;
mod builder;
mod call;
mod construct;
mod place;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;

use osem_ir::{ExprArena, ExprId, ExprKind, Name, Program, StringInterner};

use crate::diagnostics::CallStack;
use crate::errors::{self_outside_method, type_mismatch, ControlAction, EvalResult, FlowResult};
use crate::eval_mode::{EvalMode, ModeState};
use crate::operators::OperatorTable;
use crate::registry::{FunctionRegistry, TypeRegistry};
use crate::stack::ensure_sufficient_stack;
use crate::value::tag_name;
use crate::{Environment, Value};

/// Tree-walking interpreter for one program.
///
/// Built by [`InterpreterBuilder`], which registers the program's types,
/// functions and operators before the first expression is evaluated.
pub struct Interpreter<'a> {
    /// String interner for name lookup.
    pub(crate) interner: &'a StringInterner,
    /// Expression arena of the program being run.
    pub(crate) arena: &'a ExprArena,
    /// Top-level expression.
    pub(crate) body: ExprId,
    pub(crate) env: Environment,
    pub(crate) types: TypeRegistry,
    pub(crate) functions: FunctionRegistry,
    pub(crate) operators: OperatorTable,
    /// Evaluation mode: depth and budget policy.
    pub(crate) mode: EvalMode,
    /// Per-mode mutable state (call budget).
    pub(crate) mode_state: ModeState,
    /// Live call stack for depth tracking and backtrace capture.
    pub(crate) call_stack: CallStack,
}

impl<'a> Interpreter<'a> {
    /// Start building an interpreter for `program`.
    pub fn builder(program: &'a Program, interner: &'a StringInterner) -> InterpreterBuilder<'a> {
        InterpreterBuilder::new(program, interner)
    }

    /// Evaluate the program's top-level expression.
    ///
    /// A top-level `return` ends the program with its value.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> EvalResult {
        match self.eval(self.body) {
            Ok(value) => Ok(value),
            Err(action) => action.into_result(),
        }
    }

    pub fn mode(&self) -> &EvalMode {
        &self.mode
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Evaluate a single expression.
    pub fn eval(&mut self, id: ExprId) -> FlowResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> FlowResult {
        // The arena outlives `self`'s borrow, so matching on it leaves
        // `self` free for recursive evaluation.
        let arena = self.arena;
        match arena.get(id) {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Unit => Ok(Value::Unit),

            ExprKind::Ident(name) => Ok(self.read_variable(*name)?),
            ExprKind::SelfRef => {
                let place = self.env.receiver().cloned().ok_or_else(self_outside_method)?;
                Ok(self.read_place(&place, None)?)
            }
            ExprKind::Field { receiver, field } => self.eval_field(*receiver, *field),

            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),

            ExprKind::Assign { target, value } => {
                let value = self.eval(*value)?;
                let place = self.require_place(*target, || "assignment target".to_string())?;
                self.write_place(&place, value.copy())?;
                Ok(value)
            }
            ExprKind::Let { name, init } => {
                let value = self.eval(*init)?;
                self.env.declare(*name, value.copy());
                Ok(Value::Unit)
            }

            ExprKind::Construct { type_name, args } => self.construct(*type_name, *args),
            ExprKind::Call { func, args } => self.eval_call(*func, *args),
            ExprKind::MethodCall {
                receiver,
                method,
                args,
            } => self.eval_method_call(*receiver, *method, *args),

            ExprKind::Block { stmts, result } => {
                let mut scoped = self.scoped();
                for &stmt in arena.list(*stmts) {
                    scoped.eval(stmt)?;
                }
                match result {
                    Some(result) => scoped.eval(*result),
                    None => Ok(Value::Unit),
                }
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => match self.eval(*cond)? {
                Value::Bool(true) => self.eval(*then_branch),
                Value::Bool(false) => match else_branch {
                    Some(else_branch) => self.eval(*else_branch),
                    None => Ok(Value::Unit),
                },
                other => Err(type_mismatch("bool", tag_name(other.type_tag(), self.interner)).into()),
            },
            ExprKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(*value)?,
                    None => Value::Unit,
                };
                Err(ControlAction::Return(value))
            }
        }
    }

    /// Evaluate `receiver.field`.
    fn eval_field(&mut self, receiver: ExprId, field: Name) -> FlowResult {
        // Addressable receivers are read in place instead of copying the
        // whole record first.
        if let Some(place) = self.try_place(receiver)? {
            return Ok(self.read_place(&place.field(field), None)?);
        }
        let value = self.eval(receiver)?;
        Ok(self.project_field(value, field)?)
    }

    /// Evaluate a function, method or constructor body, collapsing an early
    /// `return` into the body's value.
    pub(crate) fn eval_body(&mut self, body: ExprId) -> EvalResult {
        match self.eval(body) {
            Ok(value) => Ok(value),
            Err(action) => action.into_result(),
        }
    }
}
