//! Type and function registries: record definitions, field layouts, method
//! lookup, and free functions.
//!
//! The registry owns every registered type. A type refers to its base by
//! name only, and a base must be registered before any type deriving from
//! it, so base chains are acyclic and every chain walk terminates.

use osem_ir::{ConstructorDef, ExprId, FunctionDef, MethodDef, Name, StringInterner, TypeDef};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{
    duplicate_function, duplicate_member, duplicate_type, field_shadow, no_such_method,
    unknown_base, unknown_type, EvalError,
};
use crate::value::{RecordValue, SharedLayout, StructLayout};
use crate::Value;

/// A registered record type.
#[derive(Clone, Debug)]
pub struct TypeInfo {
    pub name: Name,
    pub base: Option<Name>,
    layout: SharedLayout,
    /// Default initializer per layout slot, inherited ones included.
    defaults: Vec<Option<ExprId>>,
    /// Methods declared by this type itself.
    methods: FxHashMap<Name, MethodDef>,
    constructor: Option<ConstructorDef>,
}

impl TypeInfo {
    pub fn layout(&self) -> &SharedLayout {
        &self.layout
    }

    /// Default initializers in layout order.
    pub fn defaults(&self) -> &[Option<ExprId>] {
        &self.defaults
    }

    /// A method declared directly on this type (no inheritance).
    pub fn own_method(&self, name: Name) -> Option<&MethodDef> {
        self.methods.get(&name)
    }
}

/// A method found by chain lookup, together with the type that declares it.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedMethod<'a> {
    pub owner: Name,
    pub def: &'a MethodDef,
}

/// A constructor found by chain lookup.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedConstructor<'a> {
    pub owner: Name,
    pub def: &'a ConstructorDef,
}

/// Registry of record types.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<Name, TypeInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type definition.
    ///
    /// Fails if the name is taken, the base is not registered, a member is
    /// declared twice (a field and a method count as one namespace), or an
    /// own field redeclares an inherited one.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = interner.lookup(def.name)))]
    pub fn define(&mut self, def: &TypeDef, interner: &StringInterner) -> Result<(), EvalError> {
        let type_str = interner.lookup(def.name);
        if self.types.contains_key(&def.name) {
            return Err(duplicate_type(type_str));
        }

        let (mut names, mut defaults) = match def.base {
            Some(base) => {
                let base_info = self
                    .types
                    .get(&base)
                    .ok_or_else(|| unknown_base(type_str, interner.lookup(base)))?;
                (
                    base_info.layout.names().to_vec(),
                    base_info.defaults.clone(),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        let mut seen = FxHashSet::default();
        for field in &def.fields {
            if !seen.insert(field.name) {
                return Err(duplicate_member(type_str, interner.lookup(field.name)));
            }
            if names.contains(&field.name) {
                let owner = self.field_owner(def.base, field.name).unwrap_or(def.name);
                return Err(field_shadow(
                    type_str,
                    interner.lookup(field.name),
                    interner.lookup(owner),
                ));
            }
            names.push(field.name);
            defaults.push(field.default);
        }

        let mut methods = FxHashMap::default();
        for method in &def.methods {
            let clash = seen.contains(&method.name);
            if clash || methods.insert(method.name, method.clone()).is_some() {
                return Err(duplicate_member(type_str, interner.lookup(method.name)));
            }
        }

        tracing::debug!(
            fields = names.len(),
            methods = methods.len(),
            base = def.base.map(|b| interner.lookup(b)),
            "registered type"
        );

        self.types.insert(
            def.name,
            TypeInfo {
                name: def.name,
                base: def.base,
                layout: SharedLayout::new(StructLayout::new(names)),
                defaults,
                methods,
                constructor: def.constructor.clone(),
            },
        );
        Ok(())
    }

    /// Which type in the chain starting at `start` declares `field`.
    fn field_owner(&self, start: Option<Name>, field: Name) -> Option<Name> {
        let mut found = None;
        let mut current = start;
        while let Some(name) = current {
            let info = self.types.get(&name)?;
            if info.layout.index_of(field).is_some() {
                found = Some(name);
            }
            current = info.base;
        }
        found
    }

    pub fn get(&self, name: Name) -> Option<&TypeInfo> {
        self.types.get(&name)
    }

    pub fn contains(&self, name: Name) -> bool {
        self.types.contains_key(&name)
    }

    /// Iterate from `type_name` up through its bases.
    pub fn base_chain(&self, type_name: Name) -> BaseChain<'_> {
        BaseChain {
            registry: self,
            next: Some(type_name),
        }
    }

    /// Find a method by walking from `type_name` up the base chain.
    ///
    /// The first match wins, so a derived method hides a base method of the
    /// same name.
    pub fn find_method(&self, type_name: Name, method: Name) -> Option<ResolvedMethod<'_>> {
        self.base_chain(type_name).find_map(|info| {
            info.methods.get(&method).map(|def| ResolvedMethod {
                owner: info.name,
                def,
            })
        })
    }

    /// Like [`TypeRegistry::find_method`], failing with `NoSuchMethod` when
    /// the chain is exhausted.
    pub fn lookup_method(
        &self,
        type_name: Name,
        method: Name,
        interner: &StringInterner,
    ) -> Result<ResolvedMethod<'_>, EvalError> {
        self.find_method(type_name, method).ok_or_else(|| {
            no_such_method(interner.lookup(method), interner.lookup(type_name))
        })
    }

    /// The nearest constructor in the chain, if any type declares one.
    pub fn find_constructor(&self, type_name: Name) -> Option<ResolvedConstructor<'_>> {
        self.constructor_chain(type_name).next()
    }

    /// Every constructor in the chain, nearest first.
    pub fn constructor_chain(
        &self,
        type_name: Name,
    ) -> impl Iterator<Item = ResolvedConstructor<'_>> + '_ {
        self.base_chain(type_name).filter_map(|info| {
            info.constructor.as_ref().map(|def| ResolvedConstructor {
                owner: info.name,
                def,
            })
        })
    }

    /// Ordered field names: base fields first, then the type's own.
    pub fn field_layout(
        &self,
        type_name: Name,
        interner: &StringInterner,
    ) -> Result<&SharedLayout, EvalError> {
        self.types
            .get(&type_name)
            .map(TypeInfo::layout)
            .ok_or_else(|| unknown_type(interner.lookup(type_name)))
    }

    /// Build a fresh owned record from field values in layout order.
    pub fn new_record(
        &self,
        type_name: Name,
        fields: Vec<Value>,
        interner: &StringInterner,
    ) -> Result<Value, EvalError> {
        let layout = self.field_layout(type_name, interner)?.clone();
        Ok(Value::Record(RecordValue::new(type_name, layout, fields)))
    }
}

/// Registry of free functions, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<Name, FunctionDef>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, def: FunctionDef, interner: &StringInterner) -> Result<(), EvalError> {
        if self.functions.contains_key(&def.name) {
            return Err(duplicate_function(interner.lookup(def.name)));
        }
        tracing::debug!(
            function = interner.lookup(def.name),
            params = def.params.len(),
            "registered function"
        );
        self.functions.insert(def.name, def);
        Ok(())
    }

    pub fn get(&self, name: Name) -> Option<&FunctionDef> {
        self.functions.get(&name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Iterator over a type and its bases, most derived first.
pub struct BaseChain<'a> {
    registry: &'a TypeRegistry,
    next: Option<Name>,
}

impl<'a> Iterator for BaseChain<'a> {
    type Item = &'a TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let info = self.registry.types.get(&self.next?)?;
        self.next = info.base;
        Some(info)
    }
}
