//! `InterpreterBuilder`: program registration and interpreter setup.

use osem_ir::{Name, Program, StringInterner, TypeTag};

use super::Interpreter;
use crate::diagnostics::CallStack;
use crate::errors::{unknown_type, EvalError};
use crate::eval_mode::{EvalMode, ModeState};
use crate::operators::OperatorTable;
use crate::registry::{FunctionRegistry, TypeRegistry};
use crate::{Environment, Value};

/// Builder for an [`Interpreter`] over one program.
///
/// The default mode is [`EvalMode::Interpret`].
pub struct InterpreterBuilder<'a> {
    program: &'a Program,
    interner: &'a StringInterner,
    mode: EvalMode,
    bindings: Vec<(Name, Value)>,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new(program: &'a Program, interner: &'a StringInterner) -> Self {
        Self {
            program,
            interner,
            mode: EvalMode::default(),
            bindings: Vec::new(),
        }
    }

    /// Set the evaluation mode (depth limit and call budget).
    #[must_use]
    pub fn mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a global binding visible from every frame.
    #[must_use]
    pub fn binding(mut self, name: Name, value: Value) -> Self {
        self.bindings.push((name, value));
        self
    }

    #[must_use]
    pub fn bindings(mut self, bindings: impl IntoIterator<Item = (Name, Value)>) -> Self {
        self.bindings.extend(bindings);
        self
    }

    /// Register the program's declarations and build the interpreter.
    ///
    /// Types register in declaration order, then type-level operator
    /// overloads, then free functions and free operator functions. The
    /// first registration error aborts the build.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build(self) -> Result<Interpreter<'a>, EvalError> {
        let interner = self.interner;
        let program = self.program;

        let mut types = TypeRegistry::new();
        for def in &program.types {
            types.define(def, interner)?;
        }

        let mut operators = OperatorTable::new();
        for def in &program.types {
            for op in &def.operators {
                check_tag(&types, op.right, interner)?;
                operators.register_method(def.name, op.clone(), interner)?;
            }
        }

        let mut functions = FunctionRegistry::new();
        for def in &program.functions {
            functions.define(def.clone(), interner)?;
        }

        for def in &program.operators {
            check_tag(&types, def.left, interner)?;
            check_tag(&types, def.right, interner)?;
            operators.register_function(def.clone(), interner)?;
        }

        let mut env = Environment::new();
        for (name, value) in self.bindings {
            env.define_global(name, value);
        }

        tracing::debug!(
            types = program.types.len(),
            functions = functions.len(),
            operators = operators.len(),
            "program registered"
        );

        Ok(Interpreter {
            interner,
            arena: &program.arena,
            body: program.body,
            env,
            types,
            functions,
            operators,
            call_stack: CallStack::new(self.mode.max_recursion_depth()),
            mode_state: ModeState::new(&self.mode),
            mode: self.mode,
        })
    }
}

/// An overload operand naming a record type must name a registered one.
fn check_tag(types: &TypeRegistry, tag: TypeTag, interner: &StringInterner) -> Result<(), EvalError> {
    match tag {
        TypeTag::Record(name) if !types.contains(name) => Err(unknown_type(interner.lookup(name))),
        _ => Ok(()),
    }
}
