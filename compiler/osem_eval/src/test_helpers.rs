//! Hand-built programs for evaluator tests.
//!
//! `ProgramBuilder` stands in for a parser: it allocates expressions in an
//! arena and collects declarations, then runs the finished program.

#![allow(
    dead_code,
    reason = "shared by every scenario module; no single module uses all helpers"
)]

use osem_ir::{
    BinaryOp, ConstructorDef, ExprArena, ExprId, ExprKind, FieldDef, FunctionDef, Name,
    OperatorFnDef, OperatorMethodDef, Param, Program, SharedInterner, TypeDef, TypeTag,
};

use crate::{evaluate_with_mode, EvalMode, EvalResult, Value};

/// Builder for test programs.
pub struct ProgramBuilder {
    pub interner: SharedInterner,
    arena: ExprArena,
    types: Vec<TypeDef>,
    functions: Vec<FunctionDef>,
    operators: Vec<OperatorFnDef>,
    bindings: Vec<(Name, Value)>,
    mode: EvalMode,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        ProgramBuilder {
            interner: SharedInterner::new(),
            arena: ExprArena::new(),
            types: Vec::new(),
            functions: Vec::new(),
            operators: Vec::new(),
            bindings: Vec::new(),
            mode: EvalMode::default(),
        }
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    pub fn record_tag(&self, type_name: &str) -> TypeTag {
        TypeTag::Record(self.name(type_name))
    }

    pub fn value(&self, name: &str) -> Param {
        Param::value(self.name(name))
    }

    pub fn alias(&self, name: &str) -> Param {
        Param::alias(self.name(name))
    }

    fn alloc(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(kind)
    }

    // Expressions

    pub fn int(&mut self, n: i64) -> ExprId {
        self.alloc(ExprKind::Int(n))
    }

    pub fn float(&mut self, x: f64) -> ExprId {
        self.alloc(ExprKind::Float(x))
    }

    pub fn bool(&mut self, b: bool) -> ExprId {
        self.alloc(ExprKind::Bool(b))
    }

    pub fn unit(&mut self) -> ExprId {
        self.alloc(ExprKind::Unit)
    }

    pub fn var(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Ident(name))
    }

    pub fn self_ref(&mut self) -> ExprId {
        self.alloc(ExprKind::SelfRef)
    }

    pub fn field(&mut self, receiver: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.alloc(ExprKind::Field { receiver, field })
    }

    /// `self.field`
    pub fn self_field(&mut self, field: &str) -> ExprId {
        let receiver = self.self_ref();
        self.field(receiver, field)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.alloc(ExprKind::Binary { op, left, right })
    }

    pub fn add(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn assign(&mut self, target: ExprId, value: ExprId) -> ExprId {
        self.alloc(ExprKind::Assign { target, value })
    }

    pub fn let_(&mut self, name: &str, init: ExprId) -> ExprId {
        let name = self.name(name);
        self.alloc(ExprKind::Let { name, init })
    }

    pub fn construct(&mut self, type_name: &str, args: &[ExprId]) -> ExprId {
        let type_name = self.name(type_name);
        let args = self.arena.alloc_list(args.iter().copied());
        self.alloc(ExprKind::Construct { type_name, args })
    }

    pub fn call(&mut self, func: &str, args: &[ExprId]) -> ExprId {
        let func = self.name(func);
        let args = self.arena.alloc_list(args.iter().copied());
        self.alloc(ExprKind::Call { func, args })
    }

    pub fn method_call(&mut self, receiver: ExprId, method: &str, args: &[ExprId]) -> ExprId {
        let method = self.name(method);
        let args = self.arena.alloc_list(args.iter().copied());
        self.alloc(ExprKind::MethodCall {
            receiver,
            method,
            args,
        })
    }

    pub fn block(&mut self, stmts: &[ExprId], result: Option<ExprId>) -> ExprId {
        let stmts = self.arena.alloc_list(stmts.iter().copied());
        self.alloc(ExprKind::Block { stmts, result })
    }

    pub fn if_(&mut self, cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId>) -> ExprId {
        self.alloc(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> ExprId {
        self.alloc(ExprKind::Return(value))
    }

    // Declarations

    /// A record type with default-less fields.
    pub fn record(&self, name: &str, base: Option<&str>, fields: &[&str]) -> TypeDef {
        let mut def = TypeDef::new(self.name(name));
        def.base = base.map(|b| self.name(b));
        def.fields = fields
            .iter()
            .map(|f| FieldDef {
                name: self.name(f),
                default: None,
            })
            .collect();
        def
    }

    pub fn method(&self, name: &str, params: Vec<Param>, body: ExprId) -> FunctionDef {
        FunctionDef {
            name: self.name(name),
            params,
            body,
        }
    }

    pub fn constructor(params: Vec<Param>, body: ExprId) -> ConstructorDef {
        ConstructorDef { params, body }
    }

    pub fn operator_method(
        &self,
        op: BinaryOp,
        right: TypeTag,
        param: Param,
        body: ExprId,
    ) -> OperatorMethodDef {
        OperatorMethodDef {
            op,
            right,
            param,
            body,
        }
    }

    pub fn add_type(&mut self, def: TypeDef) -> &mut Self {
        self.types.push(def);
        self
    }

    pub fn add_function(&mut self, name: &str, params: Vec<Param>, body: ExprId) -> &mut Self {
        let def = self.method(name, params, body);
        self.functions.push(def);
        self
    }

    pub fn add_operator(&mut self, def: OperatorFnDef) -> &mut Self {
        self.operators.push(def);
        self
    }

    pub fn add_binding(&mut self, name: &str, value: Value) -> &mut Self {
        let name = self.name(name);
        self.bindings.push((name, value));
        self
    }

    pub fn set_mode(&mut self, mode: EvalMode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Finish the program with `body` as its top-level expression.
    pub fn finish(&mut self, body: ExprId) -> Program {
        Program {
            arena: std::mem::take(&mut self.arena),
            types: std::mem::take(&mut self.types),
            functions: std::mem::take(&mut self.functions),
            operators: std::mem::take(&mut self.operators),
            body,
        }
    }

    /// Finish and evaluate the program.
    pub fn run(&mut self, body: ExprId) -> EvalResult {
        let program = self.finish(body);
        let bindings = std::mem::take(&mut self.bindings);
        evaluate_with_mode(&program, &self.interner, bindings, self.mode.clone())
    }

    /// Render a value with names resolved, e.g. `Point(x: 6, y: 8)`.
    pub fn show(&self, value: &Value) -> String {
        value.display(&self.interner).to_string()
    }
}
