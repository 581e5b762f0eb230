//! Binding environment: named slots, alias places, and scoping.
//!
//! Every value-mode binding owns one slot in the [`Store`]. An alias-mode
//! binding owns nothing; it holds a [`Place`] naming another binding's slot
//! (plus a field path), and reads and writes go through that place.
//!
//! Scoping has two levels. A call pushes a [`Frame`]; a block pushes a
//! scope inside the current frame. Name lookup searches the current frame's
//! scopes innermost-to-outermost, then the fields of `self` (inside a
//! method), then the global scope. Caller frames are never searched.

use osem_ir::{Name, TypeTag};
use rustc_hash::FxHashMap;

use crate::Value;

/// Index of a storage slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotId(u32);

impl SlotId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// An addressable storage location: a slot, optionally narrowed to a
/// nested field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Place {
    pub slot: SlotId,
    pub path: Vec<Name>,
}

impl Place {
    /// The whole value in `slot`.
    pub fn root(slot: SlotId) -> Self {
        Place {
            slot,
            path: Vec::new(),
        }
    }

    /// The `field` of the value at this place.
    #[must_use]
    pub fn field(&self, field: Name) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(field);
        Place {
            slot: self.slot,
            path,
        }
    }
}

/// Error returned by environment accesses.
///
/// Typed so the interpreter can produce the right diagnostic with resolved
/// names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessError {
    /// Name not bound in any visible scope.
    Undefined,
    /// A field path step named a field the record does not have.
    NoField { field: Name, type_name: Name },
    /// A field path step was applied to a non-record value.
    NotARecord { field: Name, found: TypeTag },
    /// The slot was released. Unreachable while the alias discipline holds.
    Dangling,
}

/// A variable binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Value-mode: this binding is the sole owner of the slot.
    Owned(SlotId),
    /// Alias-mode: reads and writes forward to another binding's storage.
    Alias(Place),
}

/// Slot storage shared by all frames.
#[derive(Debug, Default)]
pub struct Store {
    slots: Vec<Option<Value>>,
    free: Vec<SlotId>,
}

impl Store {
    /// Allocate a slot holding `value`, reusing a released slot if one is free.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` slots are live.
    pub fn alloc(&mut self, value: Value) -> SlotId {
        if let Some(slot) = self.free.pop() {
            self.slots[slot.index()] = Some(value);
            return slot;
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| panic!("storage slots exhausted"));
        self.slots.push(Some(value));
        SlotId(index)
    }

    /// Release a slot. Releasing twice is a no-op.
    pub fn release(&mut self, slot: SlotId) {
        if let Some(entry) = self.slots.get_mut(slot.index()) {
            if entry.take().is_some() {
                self.free.push(slot);
            }
        }
    }

    /// Remove and return the value in `slot`, releasing it.
    pub fn take(&mut self, slot: SlotId) -> Option<Value> {
        let value = self.slots.get_mut(slot.index())?.take();
        if value.is_some() {
            self.free.push(slot);
        }
        value
    }

    pub fn get(&self, slot: SlotId) -> Option<&Value> {
        self.slots.get(slot.index())?.as_ref()
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Value> {
        self.slots.get_mut(slot.index())?.as_mut()
    }

    /// Number of live slots.
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Resolve a place to a shared reference.
    pub fn read_place(&self, place: &Place) -> Result<&Value, AccessError> {
        let mut current = self.get(place.slot).ok_or(AccessError::Dangling)?;
        for &field in &place.path {
            current = match current {
                Value::Record(r) => r.get_field(field).ok_or(AccessError::NoField {
                    field,
                    type_name: r.type_name,
                })?,
                other => {
                    return Err(AccessError::NotARecord {
                        field,
                        found: other.type_tag(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Resolve a place to a mutable reference.
    pub fn place_mut(&mut self, place: &Place) -> Result<&mut Value, AccessError> {
        let mut current = self.get_mut(place.slot).ok_or(AccessError::Dangling)?;
        for &field in &place.path {
            current = match current {
                Value::Record(r) => {
                    let type_name = r.type_name;
                    r.get_field_mut(field)
                        .ok_or(AccessError::NoField { field, type_name })?
                }
                other => {
                    return Err(AccessError::NotARecord {
                        field,
                        found: other.type_tag(),
                    })
                }
            };
        }
        Ok(current)
    }
}

/// A single lexical scope.
#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<Name, Binding>,
    /// Slots owned by this scope's value-mode bindings.
    owned: Vec<SlotId>,
}

/// A call frame: stack of block scopes plus the receiver binding.
#[derive(Debug, Default)]
struct Frame {
    scopes: Vec<Scope>,
    /// Where `self` lives, inside a method or constructor body.
    receiver: Option<Place>,
}

impl Frame {
    fn new(receiver: Option<Place>) -> Self {
        Frame {
            scopes: vec![Scope::default()],
            receiver,
        }
    }
}

/// Environment for the interpreter.
#[derive(Debug)]
pub struct Environment {
    store: Store,
    /// Initial bindings supplied by the caller, visible from every frame.
    global: Scope,
    /// Call frames, current frame last. Never empty.
    frames: Vec<Frame>,
}

impl Environment {
    /// Create an environment with an empty global scope and a top-level frame.
    pub fn new() -> Self {
        Environment {
            store: Store::default(),
            global: Scope::default(),
            frames: vec![Frame::new(None)],
        }
    }

    /// Current call depth (the top-level frame counts as 1).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current_frame(&mut self) -> &mut Frame {
        if self.frames.is_empty() {
            self.frames.push(Frame::new(None));
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn current_scope(&mut self) -> &mut Scope {
        let frame = self.current_frame();
        if frame.scopes.is_empty() {
            frame.scopes.push(Scope::default());
        }
        let last = frame.scopes.len() - 1;
        &mut frame.scopes[last]
    }

    /// Push a block scope in the current frame.
    pub fn push_scope(&mut self) {
        self.current_frame().scopes.push(Scope::default());
    }

    /// Pop the innermost block scope, releasing the slots it owns.
    ///
    /// The frame's outermost scope is never popped here; it goes with
    /// [`Environment::pop_frame`].
    pub fn pop_scope(&mut self) {
        let frame = self.current_frame();
        if frame.scopes.len() > 1 {
            if let Some(scope) = frame.scopes.pop() {
                self.release_scope(scope);
            }
        }
    }

    /// Push a call frame, with `self` at `receiver` for method bodies.
    pub fn push_frame(&mut self, receiver: Option<Place>) {
        self.frames.push(Frame::new(receiver));
    }

    /// Pop the current call frame, releasing every slot it owns.
    ///
    /// Alias bindings are simply dropped: the storage they name belongs to
    /// the caller. The top-level frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            if let Some(frame) = self.frames.pop() {
                for scope in frame.scopes {
                    self.release_scope(scope);
                }
            }
        }
    }

    fn release_scope(&mut self, scope: Scope) {
        for slot in scope.owned {
            self.store.release(slot);
        }
    }

    /// Declare a value-mode binding in the innermost scope.
    ///
    /// Shadows any binding of the same name in outer scopes without
    /// touching it.
    pub fn declare(&mut self, name: Name, value: Value) -> SlotId {
        let slot = self.store.alloc(value);
        let scope = self.current_scope();
        scope.bindings.insert(name, Binding::Owned(slot));
        scope.owned.push(slot);
        slot
    }

    /// Declare an alias-mode binding that forwards to `target`.
    pub fn bind_alias(&mut self, name: Name, target: Place) {
        self.current_scope()
            .bindings
            .insert(name, Binding::Alias(target));
    }

    /// Define a global value-mode binding.
    pub fn define_global(&mut self, name: Name, value: Value) {
        let slot = self.store.alloc(value);
        self.global.bindings.insert(name, Binding::Owned(slot));
        self.global.owned.push(slot);
    }

    /// Where `self` lives in the current frame, if inside a method.
    pub fn receiver(&self) -> Option<&Place> {
        self.frames.last().and_then(|f| f.receiver.as_ref())
    }

    /// Look up the binding for `name` in the current frame, then the global
    /// scope. Implicit `self` fields are not considered.
    pub fn lookup_binding(&self, name: Name) -> Option<&Binding> {
        if let Some(frame) = self.frames.last() {
            for scope in frame.scopes.iter().rev() {
                if let Some(binding) = scope.bindings.get(&name) {
                    return Some(binding);
                }
            }
        }
        self.global.bindings.get(&name)
    }

    /// Resolve `name` to the storage it denotes.
    ///
    /// Order: current frame scopes, then a field of `self`, then globals.
    /// An alias resolves to its target, so aliasing an alias never builds a
    /// chain.
    pub fn resolve(&self, name: Name) -> Result<Place, AccessError> {
        if let Some(frame) = self.frames.last() {
            for scope in frame.scopes.iter().rev() {
                if let Some(binding) = scope.bindings.get(&name) {
                    return Ok(binding_place(binding));
                }
            }
            if let Some(receiver) = &frame.receiver {
                if let Ok(Value::Record(r)) = self.store.read_place(receiver) {
                    if r.has_field(name) {
                        return Ok(receiver.field(name));
                    }
                }
            }
        }
        self.global
            .bindings
            .get(&name)
            .map(binding_place)
            .ok_or(AccessError::Undefined)
    }

    /// Read the current value of `name`.
    ///
    /// For alias bindings this reads the target storage, never a stale copy.
    pub fn read(&self, name: Name) -> Result<Value, AccessError> {
        let place = self.resolve(name)?;
        self.store.read_place(&place).cloned()
    }

    /// Write `value` to `name`.
    ///
    /// Value bindings replace their local copy; alias bindings write
    /// through to the target storage.
    pub fn write(&mut self, name: Name, value: Value) -> Result<(), AccessError> {
        let place = self.resolve(name)?;
        self.write_place(&place, value)
    }

    pub fn read_place(&self, place: &Place) -> Result<&Value, AccessError> {
        self.store.read_place(place)
    }

    pub fn write_place(&mut self, place: &Place, value: Value) -> Result<(), AccessError> {
        *self.store.place_mut(place)? = value;
        Ok(())
    }

    /// Allocate a scratch slot for a temporary (e.g. a method receiver that
    /// is not addressable). The caller releases it with
    /// [`Environment::take_temp`].
    pub fn alloc_temp(&mut self, value: Value) -> SlotId {
        self.store.alloc(value)
    }

    /// Remove a scratch slot, returning its final value.
    pub fn take_temp(&mut self, slot: SlotId) -> Option<Value> {
        self.store.take(slot)
    }

    /// Number of live storage slots.
    pub fn live_slots(&self) -> usize {
        self.store.live()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn binding_place(binding: &Binding) -> Place {
    match binding {
        Binding::Owned(slot) => Place::root(*slot),
        Binding::Alias(place) => place.clone(),
    }
}
