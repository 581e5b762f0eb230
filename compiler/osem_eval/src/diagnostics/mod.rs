//! Call stack tracking for the evaluator.
//!
//! Every function, method, constructor and operator-overload invocation
//! pushes a [`CallFrame`]; return pops it. The depth limit of the active
//! [`EvalMode`](crate::EvalMode) is enforced in [`CallStack::push`], and a
//! snapshot of the live frames is attached to errors raised inside calls.

use osem_ir::{Name, StringInterner};

use crate::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace, EvalError};

/// A single frame in the live call stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallFrame {
    /// Function, method or operator name.
    pub name: Name,
    /// Declaring type for methods, constructors and overloads on a type.
    pub owner: Option<Name>,
}

impl CallFrame {
    pub fn function(name: Name) -> Self {
        CallFrame { name, owner: None }
    }

    pub fn method(owner: Name, name: Name) -> Self {
        CallFrame {
            name,
            owner: Some(owner),
        }
    }

    /// Display name, `Type.method` for members.
    pub fn display_name(&self, interner: &StringInterner) -> String {
        match self.owner {
            Some(owner) => format!("{}.{}", interner.lookup(owner), interner.lookup(self.name)),
            None => interner.lookup(self.name).to_string(),
        }
    }
}

/// Live call stack for the interpreter.
///
/// ```ignore
/// stack.push(CallFrame::method(helper, set))?;
/// // ... evaluate the body ...
/// stack.pop();
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    /// Create an empty call stack. `None` means no depth limit.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// The frame is not pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// Snapshot the live frames, most recent call first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: f.display_name(interner),
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a snapshot of this stack to `err`, unless the stack is empty
    /// or the error already carries a deeper one.
    pub fn attach_backtrace(&self, err: EvalError, interner: &StringInterner) -> EvalError {
        if self.frames.is_empty() || err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}
