//! Function and method calls.
//!
//! Arguments are evaluated left to right in the caller's frame, then the
//! callee runs in a fresh frame that sees only its parameters, its own
//! locals, the fields of `self` (for methods) and globals.

use osem_ir::{ExprId, ExprRange, Name, Param, ParamMode};

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Place;
use crate::errors::{
    arity_mismatch, no_such_method, undefined_function, ControlAction, EvalError, EvalResult,
    FlowResult,
};
use crate::value::tag_name;
use crate::Value;

/// How one argument reaches its parameter.
#[derive(Debug)]
pub(crate) enum ArgBinding {
    /// Value mode: the callee owns a copy.
    Copy(Value),
    /// Alias mode: the callee refers to the caller's storage.
    Alias(Place),
}

impl Interpreter<'_> {
    /// Check arity, then evaluate each argument per its parameter's mode.
    pub(crate) fn bind_arguments(
        &mut self,
        callee: &str,
        params: &[Param],
        args: ExprRange,
    ) -> Result<Vec<(Param, ArgBinding)>, ControlAction> {
        let arg_ids = self.arena.list(args);
        if arg_ids.len() != params.len() {
            return Err(arity_mismatch(callee, params.len(), arg_ids.len()).into());
        }
        let mut bound = Vec::with_capacity(params.len());
        for (param, &arg) in params.iter().zip(arg_ids) {
            let binding = self.bind_argument(callee, *param, arg)?;
            bound.push((*param, binding));
        }
        Ok(bound)
    }

    pub(crate) fn bind_argument(
        &mut self,
        callee: &str,
        param: Param,
        arg: ExprId,
    ) -> Result<ArgBinding, ControlAction> {
        match param.mode {
            ParamMode::Value => Ok(ArgBinding::Copy(self.eval(arg)?.copy())),
            ParamMode::Alias => {
                let param_name = self.interner.lookup(param.name);
                let place = self.require_place(arg, || {
                    format!("alias parameter `{param_name}` of {callee}")
                })?;
                tracing::trace!(param = param_name, ?place, "alias binding");
                Ok(ArgBinding::Alias(place))
            }
        }
    }

    /// Run `body` in a new frame holding `bindings`, with `self` at
    /// `receiver` for methods and constructors.
    pub(crate) fn invoke(
        &mut self,
        frame: CallFrame,
        receiver: Option<Place>,
        bindings: Vec<(Param, ArgBinding)>,
        body: ExprId,
    ) -> EvalResult {
        let interner = self.interner;
        let mut scoped = self.enter_call(frame, receiver)?;
        for (param, binding) in bindings {
            match binding {
                ArgBinding::Copy(value) => {
                    scoped.env.declare(param.name, value);
                }
                ArgBinding::Alias(place) => scoped.env.bind_alias(param.name, place),
            }
        }
        scoped
            .eval_body(body)
            .map_err(|err| scoped.call_stack.attach_backtrace(err, interner))
    }

    /// Evaluate an unqualified call `func(args)`.
    ///
    /// Inside a method, a name that is a method of `self`'s runtime type
    /// calls that method on `self`. Otherwise it names a free function.
    #[tracing::instrument(level = "debug", skip_all, fields(func = self.interner.lookup(func)))]
    pub(crate) fn eval_call(&mut self, func: Name, args: ExprRange) -> FlowResult {
        if let Some(receiver) = self.env.receiver().cloned() {
            if let Some(type_name) = self.record_type_at(&receiver)? {
                if self.types.find_method(type_name, func).is_some() {
                    return self.call_method_at(receiver, type_name, func, args);
                }
            }
        }

        let def = self
            .functions
            .get(func)
            .cloned()
            .ok_or_else(|| undefined_function(self.interner.lookup(func)))?;
        let bindings = self.bind_arguments(self.interner.lookup(func), &def.params, args)?;
        Ok(self.invoke(CallFrame::function(func), None, bindings, def.body)?)
    }

    /// Evaluate `receiver.method(args)`.
    ///
    /// The method is looked up from the receiver's runtime type. An
    /// addressable receiver is aliased; a temporary receiver is parked in a
    /// scratch slot for the duration of the call.
    #[tracing::instrument(level = "debug", skip_all, fields(method = self.interner.lookup(method)))]
    pub(crate) fn eval_method_call(
        &mut self,
        receiver: ExprId,
        method: Name,
        args: ExprRange,
    ) -> FlowResult {
        if let Some(place) = self.try_place(receiver)? {
            let type_name = self.receiver_type(&place, method)?;
            return self.call_method_at(place, type_name, method, args);
        }

        let value = self.eval(receiver)?;
        let slot = self.env.alloc_temp(value);
        let place = Place::root(slot);
        let result = self
            .receiver_type(&place, method)
            .map_err(ControlAction::from)
            .and_then(|type_name| self.call_method_at(place, type_name, method, args));
        self.env.take_temp(slot);
        result
    }

    /// Dispatch `method` on the record at `place`, whose runtime type is
    /// `type_name`.
    fn call_method_at(
        &mut self,
        place: Place,
        type_name: Name,
        method: Name,
        args: ExprRange,
    ) -> FlowResult {
        let resolved = self.types.lookup_method(type_name, method, self.interner)?;
        let owner = resolved.owner;
        let def = resolved.def.clone();
        tracing::trace!(
            receiver = self.interner.lookup(type_name),
            owner = self.interner.lookup(owner),
            "method resolved"
        );

        let frame = CallFrame::method(owner, method);
        let callee = frame.display_name(self.interner);
        let bindings = self.bind_arguments(&callee, &def.params, args)?;
        Ok(self.invoke(frame, Some(place), bindings, def.body)?)
    }

    /// Runtime type of the method receiver at `place`.
    ///
    /// Primitives have no methods, so calling one on a number fails with
    /// `NoSuchMethod` naming the primitive type.
    fn receiver_type(&self, place: &Place, method: Name) -> Result<Name, EvalError> {
        match self.env.read_place(place) {
            Ok(Value::Record(record)) => Ok(record.type_name),
            Ok(other) => Err(no_such_method(
                self.interner.lookup(method),
                tag_name(other.type_tag(), self.interner),
            )),
            Err(err) => Err(self.access_error(err, None)),
        }
    }

    /// Runtime record type at `place`, or `None` for a non-record.
    fn record_type_at(&self, place: &Place) -> Result<Option<Name>, EvalError> {
        match self.env.read_place(place) {
            Ok(value) => Ok(value.as_record().map(|r| r.type_name)),
            Err(err) => Err(self.access_error(err, None)),
        }
    }
}
