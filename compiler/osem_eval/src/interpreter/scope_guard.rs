//! RAII guards for environment scopes and call frames.
//!
//! A guard holds `&mut Interpreter` and derefs to it, so code inside the
//! guarded region uses the interpreter as usual. Dropping the guard pops
//! whatever it pushed, on every exit path including `?` and unwinding.

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Place;
use crate::errors::EvalError;

/// What a [`ScopedInterpreter`] undoes on drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GuardKind {
    /// A block scope in the current frame.
    Scope,
    /// A call frame plus its call stack entry.
    Call,
}

/// Interpreter access that pops its scope or frame when dropped.
pub struct ScopedInterpreter<'guard, 'interp> {
    interpreter: &'guard mut Interpreter<'interp>,
    kind: GuardKind,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        match self.kind {
            GuardKind::Scope => self.interpreter.env.pop_scope(),
            GuardKind::Call => {
                self.interpreter.env.pop_frame();
                self.interpreter.call_stack.pop();
            }
        }
    }
}

impl<'interp> Deref for ScopedInterpreter<'_, 'interp> {
    type Target = Interpreter<'interp>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'a> Interpreter<'a> {
    /// Push a block scope, popped when the guard drops.
    pub fn scoped(&mut self) -> ScopedInterpreter<'_, 'a> {
        self.env.push_scope();
        ScopedInterpreter {
            interpreter: self,
            kind: GuardKind::Scope,
        }
    }

    /// Enter a call: charge the call budget, push `frame` onto the call
    /// stack (checking the depth limit), and push a fresh environment frame
    /// with `self` at `receiver`.
    ///
    /// Nothing is pushed if a limit is hit; the error then carries the
    /// caller's stack.
    pub(crate) fn enter_call(
        &mut self,
        frame: CallFrame,
        receiver: Option<Place>,
    ) -> Result<ScopedInterpreter<'_, 'a>, EvalError> {
        let entered = self
            .mode_state
            .check_budget()
            .and_then(|()| self.call_stack.push(frame));
        if let Err(err) = entered {
            return Err(self.call_stack.attach_backtrace(err, self.interner));
        }
        self.env.push_frame(receiver);
        Ok(ScopedInterpreter {
            interpreter: self,
            kind: GuardKind::Call,
        })
    }
}
