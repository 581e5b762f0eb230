//! Evaluation modes.
//!
//! An `EvalMode` selects the resource policy for one `evaluate` call. It is
//! an enum with policy methods; the interpreter asks the mode rather than
//! matching on variants itself.

use crate::errors::{call_budget_exceeded, EvalError};

/// Resource policy for evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum EvalMode {
    /// No depth limit on native targets (the stack grows on demand) and no
    /// call budget.
    #[default]
    Interpret,
    /// Hard limits for untrusted or generated programs.
    Bounded {
        /// Maximum nesting of calls before `StackOverflow`.
        max_depth: usize,
        /// Maximum number of calls in total before `CallBudgetExceeded`.
        call_budget: u32,
    },
}

impl EvalMode {
    /// Maximum call depth, or `None` for unlimited.
    ///
    /// - `Interpret`: `None` on native, 200 on WASM where the stack cannot grow
    /// - `Bounded`: the configured `max_depth`
    #[inline]
    pub fn max_recursion_depth(&self) -> Option<usize> {
        match self {
            Self::Interpret => {
                #[cfg(target_arch = "wasm32")]
                {
                    Some(200)
                }
                #[cfg(not(target_arch = "wasm32"))]
                {
                    None
                }
            }
            Self::Bounded { max_depth, .. } => Some(*max_depth),
        }
    }

    /// Total call budget, or `None` for unlimited.
    #[inline]
    pub fn call_budget(&self) -> Option<u32> {
        match self {
            Self::Interpret => None,
            Self::Bounded { call_budget, .. } => Some(*call_budget),
        }
    }
}

/// Per-evaluation mutable state derived from the mode.
#[derive(Clone, Debug)]
pub struct ModeState {
    /// Calls made so far.
    pub call_count: u32,
    budget: Option<u32>,
}

impl ModeState {
    pub fn new(mode: &EvalMode) -> Self {
        Self {
            call_count: 0,
            budget: mode.call_budget(),
        }
    }

    /// Count one call against the budget.
    #[inline]
    pub fn check_budget(&mut self) -> Result<(), EvalError> {
        self.call_count = self.call_count.saturating_add(1);
        match self.budget {
            Some(budget) if self.call_count > budget => Err(call_budget_exceeded(budget)),
            _ => Ok(()),
        }
    }
}
