//! Binary operator resolution.
//!
//! Primitive number semantics are fixed and checked first. Everything else
//! goes through the [`OperatorTable`], keyed by the operator and the exact
//! runtime type tags of both operands. The table is filled during program
//! setup and never changes afterwards.

use std::cmp::Ordering;

use osem_ir::{BinaryOp, Name, OperatorFnDef, OperatorMethodDef, StringInterner, TypeTag};
use rustc_hash::FxHashMap;

use crate::errors::{
    division_by_zero, duplicate_operator, integer_overflow, invalid_overload, modulo_by_zero,
    EvalError, EvalResult,
};
use crate::value::tag_name;
use crate::Value;

/// Checked integer operation; `None` means the result overflowed.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Evaluate `left op right` when built-in semantics apply.
///
/// Returns `None` when the operand pair has no primitive meaning for `op`,
/// so the caller falls back to the overload table.
pub fn evaluate_primitive(left: &Value, right: &Value, op: BinaryOp) -> Option<EvalResult> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(eval_int_binary(*a, *b, op)),
        (Value::Float(a), Value::Float(b)) => Some(Ok(eval_float_binary(*a, *b, op))),
        (Value::Int(a), Value::Float(b)) => Some(Ok(eval_float_binary(promote(*a), *b, op))),
        (Value::Float(a), Value::Int(b)) => Some(Ok(eval_float_binary(*a, promote(*b), op))),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op).map(Ok),
        _ => None,
    }
}

#[inline]
#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float arithmetic promotes to f64 by definition"
)]
fn promote(n: i64) -> f64 {
    n as f64
}

fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                Err(division_by_zero())
            } else {
                checked_arith(a.checked_div(b), "division")
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                Err(modulo_by_zero())
            } else {
                checked_arith(a.checked_rem(b), "remainder")
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(a == b)),
        BinaryOp::NotEq => Ok(Value::Bool(a != b)),
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::LtEq => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::GtEq => Ok(Value::Bool(a >= b)),
    }
}

/// Float operations follow IEEE 754 (division by zero yields an infinity,
/// comparisons involving NaN are false except `!=`).
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> Value {
    let ord = a.partial_cmp(&b);
    match op {
        BinaryOp::Add => Value::Float(a + b),
        BinaryOp::Sub => Value::Float(a - b),
        BinaryOp::Mul => Value::Float(a * b),
        BinaryOp::Div => Value::Float(a / b),
        BinaryOp::Mod => Value::Float(a % b),
        BinaryOp::Eq => Value::Bool(ord == Some(Ordering::Equal)),
        BinaryOp::NotEq => Value::Bool(ord != Some(Ordering::Equal)),
        BinaryOp::Lt => Value::Bool(ord == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(ord, Some(Ordering::Less | Ordering::Equal))),
        BinaryOp::Gt => Value::Bool(ord == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(ord, Some(Ordering::Greater | Ordering::Equal))),
    }
}

fn eval_bool_binary(a: bool, b: bool, op: BinaryOp) -> Option<Value> {
    match op {
        BinaryOp::Eq => Some(Value::Bool(a == b)),
        BinaryOp::NotEq => Some(Value::Bool(a != b)),
        _ => None,
    }
}

/// Whether `(op, left, right)` is covered by built-in semantics.
fn is_primitive(op: BinaryOp, left: TypeTag, right: TypeTag) -> bool {
    (left.is_numeric() && right.is_numeric())
        || (left == TypeTag::Bool
            && right == TypeTag::Bool
            && matches!(op, BinaryOp::Eq | BinaryOp::NotEq))
}

/// Lookup key for an overload: operator plus exact operand type tags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperatorKey {
    pub op: BinaryOp,
    pub left: TypeTag,
    pub right: TypeTag,
}

/// A registered user-defined operator.
#[derive(Clone, Debug)]
pub enum Overload {
    /// Declared on the left operand's type; `self` is the left operand.
    Method {
        owner: Name,
        /// Frame name, e.g. `operator+`.
        name: Name,
        def: OperatorMethodDef,
    },
    /// Free operator function taking both operands as parameters.
    Function { name: Name, def: OperatorFnDef },
}

impl Overload {
    /// The name the overload's call frame is shown under.
    pub fn frame_name(&self) -> Name {
        match self {
            Overload::Method { name, .. } | Overload::Function { name, .. } => *name,
        }
    }
}

fn operator_name(op: BinaryOp, interner: &StringInterner) -> Name {
    interner.intern(&format!("operator{}", op.as_symbol()))
}

/// Table of user-defined operator overloads.
#[derive(Clone, Debug, Default)]
pub struct OperatorTable {
    entries: FxHashMap<OperatorKey, Overload>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an overload declared inside the record type `owner`.
    pub fn register_method(
        &mut self,
        owner: Name,
        def: OperatorMethodDef,
        interner: &StringInterner,
    ) -> Result<(), EvalError> {
        let key = OperatorKey {
            op: def.op,
            left: TypeTag::Record(owner),
            right: def.right,
        };
        let name = operator_name(def.op, interner);
        self.insert(key, Overload::Method { owner, name, def }, interner)
    }

    /// Register a free operator function.
    pub fn register_function(
        &mut self,
        def: OperatorFnDef,
        interner: &StringInterner,
    ) -> Result<(), EvalError> {
        let key = OperatorKey {
            op: def.op,
            left: def.left,
            right: def.right,
        };
        let name = operator_name(def.op, interner);
        self.insert(key, Overload::Function { name, def }, interner)
    }

    fn insert(
        &mut self,
        key: OperatorKey,
        overload: Overload,
        interner: &StringInterner,
    ) -> Result<(), EvalError> {
        let left = tag_name(key.left, interner);
        let right = tag_name(key.right, interner);
        if is_primitive(key.op, key.left, key.right) {
            return Err(invalid_overload(
                key.op,
                left,
                right,
                "built-in primitive operators cannot be redefined",
            ));
        }
        if self.entries.contains_key(&key) {
            return Err(duplicate_operator(key.op, left, right));
        }
        tracing::debug!(op = key.op.as_symbol(), left, right, "registered operator");
        self.entries.insert(key, overload);
        Ok(())
    }

    /// Find the overload for exact operand tags. No inheritance and no
    /// coercion is applied.
    pub fn lookup(&self, op: BinaryOp, left: TypeTag, right: TypeTag) -> Option<&Overload> {
        self.entries.get(&OperatorKey { op, left, right })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
