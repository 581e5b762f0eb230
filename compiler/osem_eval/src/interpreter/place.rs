//! Addressable storage: resolving expressions to places.
//!
//! Only variables, `self`, and field chains rooted at one of those denote
//! storage. Literals, calls, constructions and operator results are
//! temporaries.

use osem_ir::{ExprId, ExprKind, Name};

use super::Interpreter;
use crate::environment::{AccessError, Place};
use crate::errors::{
    no_such_field, not_an_lvalue, self_outside_method, type_mismatch, undefined_variable,
    EvalError, EvalResult,
};
use crate::value::tag_name;
use crate::Value;

impl Interpreter<'_> {
    /// The place `id` denotes, or `None` if it is a temporary.
    ///
    /// Never evaluates anything, so resolving a place has no side effects.
    pub(crate) fn try_place(&self, id: ExprId) -> Result<Option<Place>, EvalError> {
        match self.arena.get(id) {
            ExprKind::Ident(name) => self
                .env
                .resolve(*name)
                .map(Some)
                .map_err(|err| self.access_error(err, Some(*name))),
            ExprKind::SelfRef => self
                .env
                .receiver()
                .cloned()
                .map(Some)
                .ok_or_else(self_outside_method),
            ExprKind::Field { receiver, field } => {
                let Some(base) = self.try_place(*receiver)? else {
                    return Ok(None);
                };
                let place = base.field(*field);
                self.env
                    .read_place(&place)
                    .map_err(|err| self.access_error(err, None))?;
                Ok(Some(place))
            }
            _ => Ok(None),
        }
    }

    /// Like [`Interpreter::try_place`], failing with `NotAnLValue` for a
    /// temporary. `context` describes the use site for the message.
    pub(crate) fn require_place(
        &self,
        id: ExprId,
        context: impl FnOnce() -> String,
    ) -> Result<Place, EvalError> {
        match self.try_place(id)? {
            Some(place) => Ok(place),
            None => Err(not_an_lvalue(context(), self.arena.get(id).describe())),
        }
    }

    pub(crate) fn read_variable(&self, name: Name) -> EvalResult {
        self.env
            .read(name)
            .map_err(|err| self.access_error(err, Some(name)))
    }

    pub(crate) fn read_place(&self, place: &Place, name: Option<Name>) -> EvalResult {
        self.env
            .read_place(place)
            .cloned()
            .map_err(|err| self.access_error(err, name))
    }

    pub(crate) fn write_place(&mut self, place: &Place, value: Value) -> Result<(), EvalError> {
        self.env
            .write_place(place, value)
            .map_err(|err| self.access_error(err, None))
    }

    /// Extract `field` from a temporary value.
    pub(crate) fn project_field(&self, value: Value, field: Name) -> EvalResult {
        match value {
            Value::Record(record) => record.get_field(field).cloned().ok_or_else(|| {
                no_such_field(
                    self.interner.lookup(field),
                    self.interner.lookup(record.type_name),
                )
            }),
            other => Err(type_mismatch(
                "record",
                tag_name(other.type_tag(), self.interner),
            )),
        }
    }

    /// Convert an environment error into a diagnostic with resolved names.
    pub(crate) fn access_error(&self, err: AccessError, name: Option<Name>) -> EvalError {
        let name_str = name.map_or("<unnamed>", |n| self.interner.lookup(n));
        match err {
            AccessError::Undefined | AccessError::Dangling => undefined_variable(name_str),
            AccessError::NoField { field, type_name } => no_such_field(
                self.interner.lookup(field),
                self.interner.lookup(type_name),
            ),
            AccessError::NotARecord { found, .. } => {
                type_mismatch("record", tag_name(found, self.interner))
            }
        }
    }
}
