/// End-to-end scenarios: the same small methods pushed through all three
/// engines, checking that they agree where determinism allows and that the
/// scorer renders the protocol lines.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use verdict::bytecode::{BinOp, Cmp, FieldRef, Opcode};
use verdict::cases::InputValue;
use verdict::interpreter::DEFAULT_FUEL;
use verdict::scorer::score_lines;
use verdict::symbolic::{SearchSolver, Solver};
use verdict::{
    AbstractDomain, AbstractInterpreter, Bytecode, ClassName, Executor, Finding, Frontend,
    Interpreter, MethodDescriptor, MethodId, OpcodeTable, Outcome, SignSet, State, SymConfig,
    Type, Value,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn mid(name: &str, desc: &str) -> MethodId {
    MethodId::new(
        ClassName::new("jpamb/cases/Simple"),
        name,
        MethodDescriptor::parse(desc).unwrap(),
    )
}

fn suite(methods: Vec<(MethodId, Vec<Opcode>)>) -> Bytecode {
    let mut table = OpcodeTable::new();
    for (id, ops) in methods {
        table.insert(id, ops);
    }
    Bytecode::new(Box::new(table))
}

fn run_concrete(code: &Bytecode, id: &MethodId, args: &[InputValue]) -> Outcome {
    let mut interp = Interpreter::new(code);
    let state = State::entry_with_arrays(Arc::new(id.clone()), args);
    interp.run(state, DEFAULT_FUEL).expect("concrete run should not hit programmer errors")
}

fn run_symbolic(code: &Bytecode, id: &MethodId) -> Vec<Finding> {
    let frontend = Frontend::new(code, Arc::new(id.clone()));
    let initial = frontend.initial_state();
    let executor = Executor::new(
        frontend,
        SymConfig::default(),
        Box::new(SearchSolver::default()),
    );
    executor.run(initial).expect("symbolic run should not hit programmer errors")
}

fn symbolic_kinds(findings: &[Finding]) -> Vec<Outcome> {
    findings.iter().map(|f| f.kind).collect()
}

fn assertions_disabled_field() -> FieldRef {
    FieldRef {
        class: ClassName::new("jpamb/cases/Simple"),
        name: "$assertionsDisabled".to_string(),
    }
}

// ─── Scenario 1: divideByN ────────────────────────────────────────────────────

fn divide_by_n() -> Vec<Opcode> {
    vec![
        Opcode::Push { value: Value::Int(1) },
        Opcode::Load { ty: Type::Int, index: 0 },
        Opcode::Binary { ty: Type::Int, op: BinOp::Div },
        Opcode::Return { ty: Some(Type::Int) },
    ]
}

#[test]
fn divide_by_n_concrete_matches_symbolic() {
    let id = mid("divideByN", "(I)I");
    let code = suite(vec![(id.clone(), divide_by_n())]);

    assert_eq!(
        run_concrete(&code, &id, &[InputValue::Int(0)]),
        Outcome::DivideByZero
    );
    assert_eq!(run_concrete(&code, &id, &[InputValue::Int(5)]), Outcome::Ok);

    let kinds = symbolic_kinds(&run_symbolic(&code, &id));
    assert!(kinds.contains(&Outcome::DivideByZero));
    assert!(kinds.contains(&Outcome::Ok));

    assert_eq!(
        score_lines(&kinds),
        vec![
            "assertion error;0%",
            "ok;100%",
            "*;0%",
            "divide by zero;100%",
            "out of bounds;0%",
            "null pointer;0%",
        ]
    );
}

#[test]
fn divide_by_n_abstract_agrees() {
    let id = mid("divideByN", "(I)I");
    let code = suite(vec![(id.clone(), divide_by_n())]);
    let interp = AbstractInterpreter::<SignSet>::new(&code);
    let report = interp
        .analyze(Arc::new(id), vec![SignSet::top()])
        .unwrap();
    assert!(report.finals.contains(&Outcome::DivideByZero));
    assert!(report.finals.contains(&Outcome::Ok));
}

// ─── Scenario 2: alwaysAsserts ────────────────────────────────────────────────

fn always_asserts() -> Vec<Opcode> {
    // javac shape for `assert false`: the $assertionsDisabled guard, then
    // the collapsed AssertionError allocation
    vec![
        Opcode::Get { is_static: true, field: assertions_disabled_field() },
        Opcode::Ifz { cond: Cmp::Ne, target: 3 },
        Opcode::New { class: ClassName::new("java/lang/AssertionError") },
        Opcode::Return { ty: None },
    ]
}

#[test]
fn always_asserts_is_assertion_error_everywhere() {
    let id = mid("alwaysAsserts", "()V");
    let code = suite(vec![(id.clone(), always_asserts())]);

    assert_eq!(run_concrete(&code, &id, &[]), Outcome::AssertionError);

    let report = AbstractInterpreter::<SignSet>::new(&code)
        .analyze(Arc::new(id.clone()), vec![])
        .unwrap();
    assert_eq!(report.classification(), Outcome::AssertionError);

    let kinds = symbolic_kinds(&run_symbolic(&code, &id));
    // the static field reads as concrete 0, so only the asserting path is
    // feasible and `ok` must not be reported
    assert!(kinds.contains(&Outcome::AssertionError));
    assert!(!kinds.contains(&Outcome::Ok));
}

// ─── Scenario 3: loopForever ──────────────────────────────────────────────────

#[test]
fn loop_forever_scores_star_everywhere() {
    let id = mid("loopForever", "()V");
    let code = suite(vec![(id.clone(), vec![Opcode::Goto { target: 0 }])]);

    assert_eq!(run_concrete(&code, &id, &[]), Outcome::Diverges);

    let report = AbstractInterpreter::<SignSet>::new(&code)
        .analyze(Arc::new(id.clone()), vec![])
        .unwrap();
    assert!(report.converged);
    assert!(report.finals.is_empty());
    assert_eq!(report.classification(), Outcome::Diverges);

    let kinds = symbolic_kinds(&run_symbolic(&code, &id));
    assert_eq!(kinds, vec![Outcome::Diverges]);
    assert_eq!(
        score_lines(&kinds),
        vec![
            "assertion error;0%",
            "ok;0%",
            "*;100%",
            "divide by zero;0%",
            "out of bounds;0%",
            "null pointer;0%",
        ]
    );
}

// ─── Scenario 4: arrayAt ──────────────────────────────────────────────────────

fn array_at() -> Vec<Opcode> {
    vec![
        Opcode::Load { ty: Type::Ref, index: 0 },
        Opcode::Load { ty: Type::Int, index: 1 },
        Opcode::ArrayLoad { ty: Type::Int },
        Opcode::Return { ty: Some(Type::Int) },
    ]
}

#[test]
fn array_at_reports_all_three_outcomes() {
    let id = mid("arrayAt", "([II)I");
    let code = suite(vec![(id.clone(), array_at())]);

    let findings = run_symbolic(&code, &id);
    let kinds = symbolic_kinds(&findings);
    assert!(kinds.contains(&Outcome::OutOfBounds));
    assert!(kinds.contains(&Outcome::NullPointer));
    assert!(kinds.contains(&Outcome::Ok));

    // every surviving path must be witnessable
    let solver = SearchSolver::default();
    for finding in &findings {
        assert!(solver.is_sat(finding.path()), "unsat path survived: {finding}");
    }
}

#[test]
fn array_at_concrete_agrees_per_input() {
    let id = mid("arrayAt", "([II)I");
    let code = suite(vec![(id.clone(), array_at())]);

    assert_eq!(
        run_concrete(&code, &id, &[InputValue::Null, InputValue::Int(0)]),
        Outcome::NullPointer
    );
    assert_eq!(
        run_concrete(
            &code,
            &id,
            &[InputValue::IntArray(vec![50, 100, 200]), InputValue::Int(7)]
        ),
        Outcome::OutOfBounds
    );
    assert_eq!(
        run_concrete(
            &code,
            &id,
            &[InputValue::IntArray(vec![50, 100, 200]), InputValue::Int(-1)]
        ),
        Outcome::OutOfBounds
    );
    assert_eq!(
        run_concrete(
            &code,
            &id,
            &[InputValue::IntArray(vec![50, 100, 200]), InputValue::Int(2)]
        ),
        Outcome::Ok
    );
}

// ─── Scenario 5: add (overflow is informational) ──────────────────────────────

#[test]
fn add_overflow_returns_ok_with_an_event() {
    let id = mid("add", "(II)I");
    let ops = vec![
        Opcode::Load { ty: Type::Int, index: 0 },
        Opcode::Load { ty: Type::Int, index: 1 },
        Opcode::Binary { ty: Type::Int, op: BinOp::Add },
        Opcode::Return { ty: Some(Type::Int) },
    ];
    let code = suite(vec![(id.clone(), ops)]);

    let mut interp = Interpreter::new(&code);
    let state = State::entry(
        Arc::new(id),
        &[Value::Int(i32::MAX), Value::Int(1)],
    );
    let outcome = interp.run(state, DEFAULT_FUEL).unwrap();
    assert_eq!(outcome, Outcome::Ok);
    assert_eq!(interp.events().len(), 1);
    assert_eq!(interp.events()[0].lhs, i32::MAX);
    assert_eq!(interp.events()[0].rhs, 1);
}

// ─── Scenario 6: assertBoolean / tricky ───────────────────────────────────────

fn assert_boolean_helper() -> (MethodId, Vec<Opcode>) {
    let id = mid("assertBoolean", "(Z)V");
    let ops = vec![
        Opcode::Load { ty: Type::Boolean, index: 0 },
        Opcode::Ifz { cond: Cmp::Ne, target: 3 },
        Opcode::New { class: ClassName::new("java/lang/AssertionError") },
        Opcode::Return { ty: None },
    ];
    (id, ops)
}

#[test]
fn tricky_forks_on_the_asserted_argument() {
    let (helper_id, helper_ops) = assert_boolean_helper();
    let tricky_id = mid("tricky", "(Z)V");
    let tricky_ops = vec![
        Opcode::Load { ty: Type::Boolean, index: 0 },
        Opcode::InvokeStatic { method: helper_id.clone() },
        Opcode::Return { ty: None },
    ];
    let code = suite(vec![
        (helper_id, helper_ops),
        (tricky_id.clone(), tricky_ops),
    ]);

    // symbolic: the helper is inlined as a fork, no interprocedural walk
    let kinds = symbolic_kinds(&run_symbolic(&code, &tricky_id));
    assert!(kinds.contains(&Outcome::AssertionError));
    assert!(kinds.contains(&Outcome::Ok));

    // concrete: the helper's own bytecode runs through InvokeStatic
    assert_eq!(
        run_concrete(&code, &tricky_id, &[InputValue::Bool(false)]),
        Outcome::AssertionError
    );
    assert_eq!(
        run_concrete(&code, &tricky_id, &[InputValue::Bool(true)]),
        Outcome::Ok
    );
}

// ─── Missing methods ──────────────────────────────────────────────────────────

#[test]
fn unknown_method_scores_star() {
    let id = mid("ghost", "()V");
    let code = suite(vec![]);

    assert_eq!(run_concrete(&code, &id, &[]), Outcome::Diverges);
    let kinds = symbolic_kinds(&run_symbolic(&code, &id));
    assert_eq!(kinds, vec![Outcome::Diverges]);
}
