//! Record construction: field defaults, positional arguments and
//! constructor bodies.

use crate::errors::EvalErrorKind;
use crate::test_helpers::ProgramBuilder;
use crate::{EvalMode, Value};
use osem_ir::{BinaryOp, ExprId, TypeDef};
use pretty_assertions::assert_eq;

fn declare_point(pb: &mut ProgramBuilder) {
    let point = pb.record("Point", None, &["x", "y"]);
    pb.add_type(point);
}

/// `Helper { a }` with `Helper(v) { a = v * 2 }`.
fn doubling_helper(pb: &mut ProgramBuilder) -> TypeDef {
    let v = pb.var("v");
    let two = pb.int(2);
    let doubled = pb.binary(BinaryOp::Mul, v, two);
    let a = pb.var("a");
    let body = pb.assign(a, doubled);
    let mut def = pb.record("Helper", None, &["a"]);
    let param = pb.value("v");
    def.constructor = Some(ProgramBuilder::constructor(vec![param], body));
    def
}

fn run_show(pb: &mut ProgramBuilder, body: ExprId) -> String {
    let value = pb.run(body).unwrap();
    pb.show(&value)
}

#[test]
fn positional_arguments_fill_fields_in_layout_order() {
    let mut pb = ProgramBuilder::new();
    declare_point(&mut pb);
    let (two, three) = (pb.int(2), pb.int(3));
    let body = pb.construct("Point", &[two, three]);

    assert_eq!(run_show(&mut pb, body), "Point(x: 2, y: 3)");
}

#[test]
fn derived_positional_arguments_start_with_base_fields() {
    let mut pb = ProgramBuilder::new();
    declare_point(&mut pb);
    let point3 = pb.record("Point3", Some("Point"), &["z"]);
    pb.add_type(point3);
    let (x, y, z) = (pb.int(1), pb.int(2), pb.int(3));
    let body = pb.construct("Point3", &[x, y, z]);

    assert_eq!(run_show(&mut pb, body), "Point3(x: 1, y: 2, z: 3)");
}

/// `Config { size = 10, depth }`
fn declare_config(pb: &mut ProgramBuilder) {
    let ten = pb.int(10);
    let mut config = pb.record("Config", None, &["size", "depth"]);
    config.fields[0].default = Some(ten);
    pb.add_type(config);
}

#[test]
fn missing_arguments_keep_defaults() {
    let mut pb = ProgramBuilder::new();
    declare_config(&mut pb);
    let body = pb.construct("Config", &[]);

    assert_eq!(run_show(&mut pb, body), "Config(size: 10, depth: 0)");
}

#[test]
fn arguments_replace_leading_defaults() {
    let mut pb = ProgramBuilder::new();
    declare_config(&mut pb);
    let five = pb.int(5);
    let body = pb.construct("Config", &[five]);

    assert_eq!(run_show(&mut pb, body), "Config(size: 5, depth: 0)");
}

#[test]
fn too_many_positional_arguments() {
    let mut pb = ProgramBuilder::new();
    declare_point(&mut pb);
    let args: Vec<ExprId> = (1..=3).map(|n| pb.int(n)).collect();
    let body = pb.construct("Point", &args);

    let err = pb.run(body).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "Point".to_string(),
            expected: 2,
            got: 3,
        }
    );
}

#[test]
fn constructor_body_initializes_self() {
    let mut pb = ProgramBuilder::new();
    let helper = doubling_helper(&mut pb);
    pb.add_type(helper);
    let four = pb.int(4);
    let body = pb.construct("Helper", &[four]);

    assert_eq!(run_show(&mut pb, body), "Helper(a: 8)");
}

#[test]
fn defaults_apply_before_constructor() {
    let mut pb = ProgramBuilder::new();
    // Counter { count = 5, step } with Counter(s) { step = s; count = count + 1 }
    let s = pb.var("s");
    let step = pb.var("step");
    let set_step = pb.assign(step, s);
    let count = pb.var("count");
    let one = pb.int(1);
    let bumped = pb.add(count, one);
    let count = pb.var("count");
    let bump = pb.assign(count, bumped);
    let body = pb.block(&[set_step, bump], None);
    let five = pb.int(5);
    let mut counter = pb.record("Counter", None, &["count", "step"]);
    counter.fields[0].default = Some(five);
    let param = pb.value("s");
    counter.constructor = Some(ProgramBuilder::constructor(vec![param], body));
    pb.add_type(counter);

    let three = pb.int(3);
    let body = pb.construct("Counter", &[three]);

    assert_eq!(run_show(&mut pb, body), "Counter(count: 6, step: 3)");
}

#[test]
fn constructor_is_inherited() {
    let mut pb = ProgramBuilder::new();
    let helper = doubling_helper(&mut pb);
    pb.add_type(helper);
    let derived = pb.record("Helper2", Some("Helper"), &[]);
    pb.add_type(derived);
    let four = pb.int(4);
    let body = pb.construct("Helper2", &[four]);

    assert_eq!(run_show(&mut pb, body), "Helper2(a: 8)");
}

#[test]
fn constructor_arity_is_checked() {
    let mut pb = ProgramBuilder::new();
    let helper = doubling_helper(&mut pb);
    pb.add_type(helper);
    let body = pb.construct("Helper", &[]);

    let err = pb.run(body).unwrap_err();
    assert_eq!(err.to_string(), "Helper expects 1 argument, got 0");
}

#[test]
fn constructor_alias_parameter_reaches_caller() {
    let mut pb = ProgramBuilder::new();
    // Helper(&src) { a = src; src = 0 }
    let src = pb.var("src");
    let a = pb.var("a");
    let take = pb.assign(a, src);
    let src = pb.var("src");
    let zero = pb.int(0);
    let clear = pb.assign(src, zero);
    let body = pb.block(&[take, clear], None);
    let mut helper = pb.record("Helper", None, &["a"]);
    let param = pb.alias("src");
    helper.constructor = Some(ProgramBuilder::constructor(vec![param], body));
    pb.add_type(helper);
    let pair = pb.record("Pair", None, &["a", "b"]);
    pb.add_type(pair);

    let three = pb.int(3);
    let decl_s = pb.let_("s", three);
    let s = pb.var("s");
    let init = pb.construct("Helper", &[s]);
    let decl_h = pb.let_("h", init);
    let h = pb.var("h");
    let h_a = pb.field(h, "a");
    let s = pb.var("s");
    let result = pb.construct("Pair", &[h_a, s]);
    let body = pb.block(&[decl_s, decl_h], Some(result));

    assert_eq!(run_show(&mut pb, body), "Pair(a: 3, b: 0)");
}

#[test]
fn constructor_can_return_early() {
    let mut pb = ProgramBuilder::new();
    // Helper(v) { if v < 0 { return }; a = v }
    let v = pb.var("v");
    let zero = pb.int(0);
    let negative = pb.binary(BinaryOp::Lt, v, zero);
    let early = pb.ret(None);
    let guard = pb.if_(negative, early, None);
    let v = pb.var("v");
    let a = pb.var("a");
    let write = pb.assign(a, v);
    let body = pb.block(&[guard, write], None);
    let mut helper = pb.record("Helper", None, &["a"]);
    let param = pb.value("v");
    helper.constructor = Some(ProgramBuilder::constructor(vec![param], body));
    pb.add_type(helper);

    let minus_one = pb.int(-1);
    let body = pb.construct("Helper", &[minus_one]);

    assert_eq!(run_show(&mut pb, body), "Helper(a: 0)");
}

#[test]
fn defaults_see_globals() {
    let mut pb = ProgramBuilder::new();
    pb.add_binding("g", Value::Int(7));
    let g = pb.var("g");
    let mut config = pb.record("Config", None, &["size"]);
    config.fields[0].default = Some(g);
    pb.add_type(config);
    let body = pb.construct("Config", &[]);

    assert_eq!(run_show(&mut pb, body), "Config(size: 7)");
}

#[test]
fn defaults_do_not_see_caller_locals() {
    let mut pb = ProgramBuilder::new();
    let x = pb.var("x");
    let mut config = pb.record("Config", None, &["size"]);
    config.fields[0].default = Some(x);
    pb.add_type(config);
    let one = pb.int(1);
    let decl = pb.let_("x", one);
    let init = pb.construct("Config", &[]);
    let body = pb.block(&[decl], Some(init));

    let err = pb.run(body).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "x".to_string()
        }
    );
}

#[test]
fn self_referential_default_hits_depth_limit() {
    let mut pb = ProgramBuilder::new();
    pb.set_mode(EvalMode::Bounded {
        max_depth: 50,
        call_budget: 10_000,
    });
    // Node { next = Node() }
    let next = pb.construct("Node", &[]);
    let mut node = pb.record("Node", None, &["next"]);
    node.fields[0].default = Some(next);
    pb.add_type(node);
    let body = pb.construct("Node", &[]);

    let err = pb.run(body).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 50 });
}

#[test]
fn nested_field_assignment() {
    let mut pb = ProgramBuilder::new();
    declare_point(&mut pb);
    let line = pb.record("Line", None, &["start", "end"]);
    pb.add_type(line);

    let (a, b) = (pb.int(0), pb.int(0));
    let start = pb.construct("Point", &[a, b]);
    let (c, d) = (pb.int(1), pb.int(1));
    let end = pb.construct("Point", &[c, d]);
    let init = pb.construct("Line", &[start, end]);
    let decl = pb.let_("l", init);
    let l = pb.var("l");
    let l_end = pb.field(l, "end");
    let target = pb.field(l_end, "x");
    let five = pb.int(5);
    let write = pb.assign(target, five);
    let result = pb.var("l");
    let body = pb.block(&[decl, write], Some(result));

    assert_eq!(
        run_show(&mut pb, body),
        "Line(start: Point(x: 0, y: 0), end: Point(x: 5, y: 1))"
    );
}

#[test]
fn unknown_type_cannot_be_constructed() {
    let mut pb = ProgramBuilder::new();
    let body = pb.construct("Ghost", &[]);

    let err = pb.run(body).unwrap_err();
    assert_eq!(err.to_string(), "unknown type `Ghost`");
}

#[test]
fn undeclared_field_access() {
    let mut pb = ProgramBuilder::new();
    declare_point(&mut pb);
    let (one, two) = (pb.int(1), pb.int(2));
    let point = pb.construct("Point", &[one, two]);
    let body = pb.field(point, "z");

    let err = pb.run(body).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::NoSuchField {
            field: "z".to_string(),
            type_name: "Point".to_string(),
        }
    );
}

/// `Helper { a }` with `Helper() { a = 100 }`, and
/// `Helper2: Helper { b }` with `Helper2() { b = 5 }`.
fn two_level_constructors(pb: &mut ProgramBuilder) {
    let a = pb.var("a");
    let hundred = pb.int(100);
    let base_body = pb.assign(a, hundred);
    let mut helper = pb.record("Helper", None, &["a"]);
    helper.constructor = Some(ProgramBuilder::constructor(vec![], base_body));
    pb.add_type(helper);

    let b = pb.var("b");
    let five = pb.int(5);
    let derived_body = pb.assign(b, five);
    let mut helper2 = pb.record("Helper2", Some("Helper"), &["b"]);
    helper2.constructor = Some(ProgramBuilder::constructor(vec![], derived_body));
    pb.add_type(helper2);
}

#[test]
fn base_constructor_runs_before_derived() {
    let mut pb = ProgramBuilder::new();
    two_level_constructors(&mut pb);
    let body = pb.construct("Helper2", &[]);

    assert_eq!(run_show(&mut pb, body), "Helper2(a: 100, b: 5)");
}

#[test]
fn derived_constructor_sees_base_initialization() {
    let mut pb = ProgramBuilder::new();
    // Helper() { a = 1 }  Helper2(v) { b = a + v }
    let a = pb.var("a");
    let one = pb.int(1);
    let base_body = pb.assign(a, one);
    let mut helper = pb.record("Helper", None, &["a"]);
    helper.constructor = Some(ProgramBuilder::constructor(vec![], base_body));
    pb.add_type(helper);

    let a = pb.var("a");
    let v = pb.var("v");
    let sum = pb.add(a, v);
    let b = pb.var("b");
    let derived_body = pb.assign(b, sum);
    let mut helper2 = pb.record("Helper2", Some("Helper"), &["b"]);
    let param = pb.value("v");
    helper2.constructor = Some(ProgramBuilder::constructor(vec![param], derived_body));
    pb.add_type(helper2);

    let ten = pb.int(10);
    let body = pb.construct("Helper2", &[ten]);

    assert_eq!(run_show(&mut pb, body), "Helper2(a: 1, b: 11)");
}

#[test]
fn base_constructor_must_be_parameterless() {
    let mut pb = ProgramBuilder::new();
    let helper = doubling_helper(&mut pb);
    pb.add_type(helper);
    let unit = pb.unit();
    let mut helper2 = pb.record("Helper2", Some("Helper"), &["b"]);
    helper2.constructor = Some(ProgramBuilder::constructor(vec![], unit));
    pb.add_type(helper2);
    let body = pb.construct("Helper2", &[]);

    let err = pb.run(body).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ArityMismatch {
            name: "Helper".to_string(),
            expected: 1,
            got: 0,
        }
    );
}
