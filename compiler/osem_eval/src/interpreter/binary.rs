//! Binary expressions: primitive semantics first, then user overloads.

use osem_ir::{BinaryOp, ExprId, Param, ParamMode};

use super::call::ArgBinding;
use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Place;
use crate::errors::{operator_not_found, EvalError, FlowResult};
use crate::operators::{evaluate_primitive, Overload};
use crate::value::tag_name;
use crate::Value;

impl Interpreter<'_> {
    /// Evaluate `left op right`, operands strictly left to right.
    ///
    /// Two numbers always use built-in arithmetic. Otherwise the overload
    /// registered for the exact runtime types of both operands runs; there
    /// is no fallback when none is registered.
    pub(crate) fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> FlowResult {
        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        if let Some(result) = evaluate_primitive(&lhs, &rhs, op) {
            return Ok(result?);
        }

        let (left_tag, right_tag) = (lhs.type_tag(), rhs.type_tag());
        let Some(overload) = self.operators.lookup(op, left_tag, right_tag).cloned() else {
            return Err(operator_not_found(
                op,
                tag_name(left_tag, self.interner),
                tag_name(right_tag, self.interner),
            )
            .into());
        };
        tracing::trace!(
            op = op.as_symbol(),
            left = tag_name(left_tag, self.interner),
            right = tag_name(right_tag, self.interner),
            "overload selected"
        );

        match overload {
            Overload::Method { owner, name, def } => {
                let frame = CallFrame::method(owner, name);
                let callee = frame.display_name(self.interner);
                let right_binding = self.bind_operand(&callee, def.param, right, rhs)?;

                // `self` is a scratch copy, so the body cannot reach the
                // left operand's storage.
                let slot = self.env.alloc_temp(lhs);
                let result = self.invoke(
                    frame,
                    Some(Place::root(slot)),
                    vec![(def.param, right_binding)],
                    def.body,
                );
                self.env.take_temp(slot);
                Ok(result?)
            }
            Overload::Function { name, def } => {
                let frame = CallFrame::function(name);
                let callee = frame.display_name(self.interner);
                let [left_param, right_param] = def.params;
                let left_binding = self.bind_operand(&callee, left_param, left, lhs)?;
                let right_binding = self.bind_operand(&callee, right_param, right, rhs)?;
                Ok(self.invoke(
                    frame,
                    None,
                    vec![(left_param, left_binding), (right_param, right_binding)],
                    def.body,
                )?)
            }
        }
    }

    /// Bind an already evaluated operand to an overload parameter.
    fn bind_operand(
        &self,
        callee: &str,
        param: Param,
        operand: ExprId,
        value: Value,
    ) -> Result<ArgBinding, EvalError> {
        match param.mode {
            ParamMode::Value => Ok(ArgBinding::Copy(value)),
            ParamMode::Alias => {
                let param_name = self.interner.lookup(param.name);
                self.require_place(operand, || {
                    format!("alias parameter `{param_name}` of {callee}")
                })
                .map(ArgBinding::Alias)
            }
        }
    }
}
