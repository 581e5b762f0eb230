//! Record construction.
//!
//! A fresh record starts from its field defaults, evaluated in layout order
//! in a frame of their own that sees only globals. A field with no default
//! starts as `0`. Then either the constructors of the base chain run with
//! `self` bound to the new record, or the arguments are assigned to fields
//! positionally.
//!
//! The nearest constructor takes the arguments. Every constructor above it
//! must be parameterless and runs first, base-most first.

use osem_ir::{ConstructorDef, ExprId, ExprRange, Name, Param};

use super::call::ArgBinding;
use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::{AccessError, Place, SlotId};
use crate::errors::{arity_mismatch, unknown_type, EvalError, FlowResult};
use crate::Value;

impl Interpreter<'_> {
    #[tracing::instrument(level = "debug", skip_all, fields(ty = self.interner.lookup(type_name)))]
    pub(crate) fn construct(&mut self, type_name: Name, args: ExprRange) -> FlowResult {
        let type_str = self.interner.lookup(type_name);
        let defaults = self
            .types
            .get(type_name)
            .map(|info| info.defaults().to_vec())
            .ok_or_else(|| unknown_type(type_str))?;

        let chain: Vec<(Name, ConstructorDef)> = self
            .types
            .constructor_chain(type_name)
            .map(|ctor| (ctor.owner, ctor.def.clone()))
            .collect();
        let Some(((owner, ctor), bases)) = chain.split_first() else {
            return self.construct_positional(type_name, &defaults, args);
        };
        // Constructors above the nearest one take no arguments.
        if let Some((base_owner, base_ctor)) = bases.iter().find(|(_, c)| !c.params.is_empty()) {
            return Err(arity_mismatch(
                self.interner.lookup(*base_owner),
                base_ctor.params.len(),
                0,
            )
            .into());
        }

        let bindings = self.bind_arguments(type_str, &ctor.params, args)?;
        let fields = self.initial_fields(type_name, &defaults)?;
        let record = self.types.new_record(type_name, fields, self.interner)?;

        let slot = self.env.alloc_temp(record);
        let result = self.run_constructors(slot, type_name, bases, (*owner, ctor), bindings);
        let record = self.env.take_temp(slot);
        result?;
        Ok(record.ok_or_else(|| self.access_error(AccessError::Dangling, None))?)
    }

    /// Run base constructors base-most first, then the nearest one, all
    /// with `self` at `slot`.
    fn run_constructors(
        &mut self,
        slot: SlotId,
        type_name: Name,
        bases: &[(Name, ConstructorDef)],
        (owner, ctor): (Name, &ConstructorDef),
        bindings: Vec<(Param, ArgBinding)>,
    ) -> Result<(), EvalError> {
        for (base_owner, base_ctor) in bases.iter().rev() {
            self.invoke(
                CallFrame::method(*base_owner, type_name),
                Some(Place::root(slot)),
                Vec::new(),
                base_ctor.body,
            )?;
        }
        self.invoke(
            CallFrame::method(owner, type_name),
            Some(Place::root(slot)),
            bindings,
            ctor.body,
        )?;
        Ok(())
    }

    /// Assign arguments to fields in layout order; trailing fields keep
    /// their defaults.
    fn construct_positional(
        &mut self,
        type_name: Name,
        defaults: &[Option<ExprId>],
        args: ExprRange,
    ) -> FlowResult {
        let arg_ids = self.arena.list(args);
        if arg_ids.len() > defaults.len() {
            return Err(arity_mismatch(
                self.interner.lookup(type_name),
                defaults.len(),
                arg_ids.len(),
            )
            .into());
        }

        let mut fields = Vec::with_capacity(defaults.len());
        for &arg in arg_ids {
            fields.push(self.eval(arg)?.copy());
        }
        fields.extend(self.initial_fields(type_name, &defaults[arg_ids.len()..])?);
        Ok(self.types.new_record(type_name, fields, self.interner)?)
    }

    /// Evaluate field defaults. Initializer expressions run as a call of
    /// `type_name`, so self-referential defaults hit the depth limit.
    fn initial_fields(
        &mut self,
        type_name: Name,
        defaults: &[Option<ExprId>],
    ) -> Result<Vec<Value>, EvalError> {
        if defaults.iter().all(Option::is_none) {
            return Ok(vec![Value::Int(0); defaults.len()]);
        }
        let interner = self.interner;
        let mut scoped = self.enter_call(CallFrame::function(type_name), None)?;
        let mut fields = Vec::with_capacity(defaults.len());
        for default in defaults {
            let value = match default {
                Some(init) => scoped
                    .eval_body(*init)
                    .map_err(|err| scoped.call_stack.attach_backtrace(err, interner))?,
                None => Value::Int(0),
            };
            fields.push(value);
        }
        Ok(fields)
    }
}
