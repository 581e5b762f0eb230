//! Runtime values.
//!
//! Numbers, booleans and unit are plain copies. A record owns its field
//! values inline, so cloning a record copies every field recursively and
//! the copy shares no storage with its source. Sharing between bindings is
//! never a property of a value: it only exists through alias bindings in
//! the [`Environment`](crate::Environment).

// Arc is the implementation of SharedLayout
#![expect(
    clippy::disallowed_types,
    reason = "Arc is the implementation of SharedLayout"
)]

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use osem_ir::{Name, StringInterner, TypeTag};
use rustc_hash::FxHashMap;

/// Ordered field layout of a record type.
///
/// Base fields come first, in base-declared order, followed by the type's
/// own fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    names: Vec<Name>,
    indices: FxHashMap<Name, usize>,
}

impl StructLayout {
    /// Create a layout from field names in order.
    pub fn new(names: Vec<Name>) -> Self {
        let indices = names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        StructLayout { names, indices }
    }

    /// Get the index of a field by name.
    #[inline]
    pub fn index_of(&self, field: Name) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Field names in layout order.
    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Immutable layout shared by every instance of a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedLayout(Arc<StructLayout>);

impl SharedLayout {
    pub fn new(layout: StructLayout) -> Self {
        SharedLayout(Arc::new(layout))
    }
}

impl Deref for SharedLayout {
    type Target = StructLayout;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A record instance.
#[derive(Clone, Debug)]
pub struct RecordValue {
    /// Runtime type tag, used for method dispatch and overload lookup.
    pub type_name: Name,
    /// Field values in layout order.
    fields: Vec<Value>,
    layout: SharedLayout,
}

impl RecordValue {
    /// Create a record from values in layout order.
    ///
    /// # Panics
    /// Panics in debug builds if `fields` does not match the layout length.
    pub fn new(type_name: Name, layout: SharedLayout, fields: Vec<Value>) -> Self {
        debug_assert_eq!(layout.len(), fields.len());
        RecordValue {
            type_name,
            fields,
            layout,
        }
    }

    #[inline]
    pub fn get_field(&self, field: Name) -> Option<&Value> {
        let index = self.layout.index_of(field)?;
        self.fields.get(index)
    }

    #[inline]
    pub fn get_field_mut(&mut self, field: Name) -> Option<&mut Value> {
        let index = self.layout.index_of(field)?;
        self.fields.get_mut(index)
    }

    pub fn has_field(&self, field: Name) -> bool {
        self.layout.index_of(field).is_some()
    }

    /// Iterate over `(name, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (Name, &Value)> + '_ {
        self.layout.names().iter().copied().zip(self.fields.iter())
    }
}

impl PartialEq for RecordValue {
    fn eq(&self, other: &Self) -> bool {
        // Layout is a function of the type, so it adds nothing to equality.
        self.type_name == other.type_name && self.fields == other.fields
    }
}

/// Runtime value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Unit,
    Record(RecordValue),
}

impl Value {
    /// Copy a value for assignment or value-mode parameter passing.
    ///
    /// Records are copied field by field, recursively.
    #[inline]
    #[must_use]
    pub fn copy(&self) -> Value {
        self.clone()
    }

    /// Runtime type tag.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Bool,
            Value::Unit => TypeTag::Unit,
            Value::Record(r) => TypeTag::Record(r.type_name),
        }
    }

    /// Whether this value is a primitive number.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Display the value with names resolved through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ValueDisplay<'a> {
        ValueDisplay {
            value: self,
            interner,
        }
    }
}

/// Human-readable name of a type tag.
pub fn tag_name(tag: TypeTag, interner: &StringInterner) -> &'static str {
    match tag {
        TypeTag::Int => "int",
        TypeTag::Float => "float",
        TypeTag::Bool => "bool",
        TypeTag::Unit => "unit",
        TypeTag::Record(name) => interner.lookup(name),
    }
}

/// Helper for displaying a [`Value`] with resolved names.
pub struct ValueDisplay<'a> {
    value: &'a Value,
    interner: &'a StringInterner,
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Unit => write!(f, "()"),
            Value::Record(r) => {
                write!(f, "{}(", self.interner.lookup(r.type_name))?;
                for (i, (name, value)) in r.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "{}: {}",
                        self.interner.lookup(name),
                        value.display(self.interner)
                    )?;
                }
                write!(f, ")")
            }
        }
    }
}
