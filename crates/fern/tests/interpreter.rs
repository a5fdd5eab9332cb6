//! End-to-end interpreter tests: the read → expand → eval pipeline,
//! collection contracts, and the universal invariants as property
//! tests.

use std::io::Write;

use proptest::prelude::*;

use fern::{Config, Context, Error, Value};

fn eval_text(ctx: &mut Context, text: &str) -> fern::Result<Value> {
    let value = ctx.read(text)?;
    let value = ctx.expand(value)?;
    let env = ctx.global_env();
    ctx.eval(value, env)
}

fn eval_ok(ctx: &mut Context, text: &str) -> Value {
    eval_text(ctx, text).unwrap()
}

// === Literal scenarios ===

#[test]
fn scenario_simple_addition() {
    let mut ctx = fern::init();
    assert_eq!(eval_ok(&mut ctx, "(+ 1 2)"), Value::Int(3));
}

#[test]
fn scenario_factorial() {
    let mut ctx = fern::init();
    let program = "(define (fact n) (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 5)";
    assert_eq!(eval_ok(&mut ctx, program), Value::Int(120));
}

#[test]
fn scenario_let_binding() {
    let mut ctx = fern::init();
    assert_eq!(
        eval_ok(&mut ctx, "(let ((x 2) (y 3)) (* x y))"),
        Value::Int(6)
    );
}

#[test]
fn scenario_cond_picks_first_true_clause() {
    let mut ctx = fern::init();
    let result = eval_ok(&mut ctx, "(cond ((= 1 2) 'a) ((= 2 2) 'b) (else 'c))");
    assert_eq!(ctx.symbol_name(result), "B");
}

#[test]
fn scenario_quoted_list_with_interned_symbols() {
    let mut ctx = fern::init();
    let first = eval_ok(&mut ctx, "'(a b c)");
    assert_eq!(ctx.display(first).to_string(), "(A B C)");
    let second = eval_ok(&mut ctx, "'(a x y)");
    // the A read in one program is identical to the A read in another
    assert_eq!(ctx.car(first), ctx.car(second));
}

#[test]
fn scenario_host_collection_preserves_globals() {
    let mut ctx = fern::init();
    eval_ok(&mut ctx, "(define xs (list 1 2 3))");
    // the host collects between evaluations; `xs` survives because the
    // global environment is an implicit root
    ctx.collect(Value::Null);
    assert_eq!(eval_ok(&mut ctx, "(length xs)"), Value::Int(3));
}

// === Pipeline behavior ===

#[test]
fn test_cond_with_no_match_and_no_else_is_null() {
    let mut ctx = fern::init();
    assert_eq!(eval_ok(&mut ctx, "(cond ((= 1 2) 'a))"), Value::Null);
}

#[test]
fn test_and_or_short_circuit() {
    let mut ctx = fern::init();
    assert_eq!(eval_ok(&mut ctx, "(and 1 0 unbound)"), Value::Int(0));
    assert_eq!(eval_ok(&mut ctx, "(or 0 1 unbound)"), Value::Int(1));
    assert_eq!(eval_text(&mut ctx, "(and 1 unbound)"), Err(Error::UnknownVar));
}

#[test]
fn test_errors_surface_with_stable_strings() {
    let mut ctx = fern::init();
    let err = ctx.read("(").unwrap_err();
    assert_eq!(err, Error::ParenExpected);
    assert_eq!(err.to_string(), "syntax error: expected ) paren");
    assert_eq!(eval_text(&mut ctx, "missing"), Err(Error::UnknownVar));
}

#[test]
fn test_deep_non_tail_recursion_still_works() {
    let mut ctx = fern::init();
    eval_ok(
        &mut ctx,
        "(define (sum n) (if (= n 0) 0 (+ n (sum (- n 1)))))",
    );
    assert_eq!(eval_ok(&mut ctx, "(sum 100)"), Value::Int(5050));
}

#[test]
fn test_streaming_file_larger_than_lexer_buffers() {
    let mut program = String::from("(define (sq x) (* x x))\n");
    for i in 0..400 {
        program.push_str(&format!("(define v{i} (sq {i}))\n"));
    }
    program.push_str("(+ v19 v20)");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{program}").unwrap();

    // 64-byte buffers force many refills and split tokens
    let mut ctx = fern::init_with_config(Config {
        lex_buffer_size: 64,
        ..Config::default()
    });
    let value = ctx.read_path(file.path()).unwrap();
    let value = ctx.expand(value).unwrap();
    let env = ctx.global_env();
    let result = ctx.eval(value, env).unwrap();
    assert_eq!(result, Value::Int(19 * 19 + 20 * 20));
}

#[test]
fn test_repl_like_session_with_collections() {
    let mut ctx = fern::init();
    eval_ok(&mut ctx, "(define counter 0)");
    for _ in 0..50 {
        eval_ok(&mut ctx, "(set! counter (+ counter 1))");
        ctx.collect(Value::Null);
    }
    assert_eq!(eval_ok(&mut ctx, "counter"), Value::Int(50));
}

// === Tail calls run in constant host stack ===

#[test]
fn test_million_iteration_tail_loop() {
    let mut ctx = fern::init();
    eval_ok(
        &mut ctx,
        "(define (loop n) (if (= n 0) 'done (loop (- n 1))))",
    );
    let result = eval_ok(&mut ctx, "(loop 1000000)");
    assert_eq!(ctx.symbol_name(result), "DONE");
}

// === Collections converge to the live size ===

#[test]
fn test_collection_size_is_stable() {
    let mut ctx = fern::init();
    eval_ok(&mut ctx, "(define xs (list 1 2 3))");
    ctx.collect(Value::Null);
    ctx.collect(Value::Null);
    let settled = ctx.heap_used();
    ctx.collect(Value::Null);
    assert_eq!(ctx.heap_used(), settled);
}

// === Expansion eliminates the lowered keywords ===

fn assert_fully_expanded(ctx: &Context, expr: Value) {
    if !expr.is_pair() {
        return;
    }
    let op = ctx.car(expr);
    let name = ctx.symbol_name(op);
    assert!(
        !matches!(name, "COND" | "AND" | "OR" | "LET"),
        "unexpanded {name} operator"
    );
    if name == "QUOTE" {
        return;
    }
    if name == "DEFINE" {
        // the function form is gone
        assert!(!ctx.at_index(expr, 1).is_pair());
    }
    let mut it = expr;
    while it.is_pair() {
        assert_fully_expanded(ctx, ctx.car(it));
        it = ctx.cdr(it);
    }
}

#[test]
fn test_expansion_eliminates_surface_forms() {
    let programs = [
        "(cond ((= 1 2) 'a) (else 'b))",
        "(and (or a b) (let ((x 1)) (cond ((= x 1) x) (else 0))))",
        "(define (f a b) (and a b) (or a b))",
        "(let ((x (cond ((= 1 1) 2) (else 3)))) (lambda (y) (and x y)))",
        "(begin (define (g) 1) (g))",
    ];
    for program in programs {
        let mut ctx = fern::init_reader();
        let value = ctx.read(program).unwrap();
        let value = ctx.expand(value).unwrap();
        assert_fully_expanded(&ctx, value);
    }
}

// === Property tests ===

/// Random S-expression source text.
fn sexpr() -> impl Strategy<Value = String> {
    let atom = prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        "[a-z][a-z0-9]{0,8}",
        "[a-z ]{0,10}".prop_map(|s| format!("\"{s}\"")),
    ];
    atom.prop_recursive(4, 32, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(|items| format!("({})", items.join(" ")))
    })
}

proptest! {
    // collection preserves printed structure
    #[test]
    fn prop_collect_preserves_printing(text in sexpr()) {
        let mut ctx = fern::init_reader();
        let value = ctx.read(&text).unwrap();
        let before = ctx.display(value).to_string();
        let moved = ctx.collect(value);
        prop_assert_eq!(ctx.display(moved).to_string(), before);
    }

    // interning is case-insensitive and injective on folded names
    #[test]
    fn prop_interning_folds_case(name in "[a-z][a-z0-9?!*-]{0,12}") {
        let mut ctx = fern::init_reader();
        let plain = ctx.make_symbol(&name);
        let upper = ctx.make_symbol(&name.to_uppercase());
        let lower = ctx.make_symbol(&name.to_lowercase());
        prop_assert_eq!(plain, upper);
        prop_assert_eq!(plain, lower);
    }

    #[test]
    fn prop_distinct_names_distinct_symbols(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
    ) {
        prop_assume!(a != b);
        let mut ctx = fern::init_reader();
        let sym_a = ctx.make_symbol(&a);
        let sym_b = ctx.make_symbol(&b);
        prop_assert_ne!(sym_a, sym_b);
    }

    // reversing twice restores order
    #[test]
    fn prop_double_reverse_restores(items in prop::collection::vec(any::<i32>(), 0..32)) {
        let mut ctx = fern::init_reader();
        let values: Vec<Value> = items.iter().map(|&n| Value::Int(i64::from(n))).collect();
        let list = ctx.list_from(&values);
        let once = ctx.reverse_inplace(list);
        let twice = ctx.reverse_inplace(once);
        prop_assert_eq!(ctx.length(twice), items.len());
        let mut it = twice;
        for &expected in &items {
            prop_assert_eq!(ctx.car(it), Value::Int(i64::from(expected)));
            it = ctx.cdr(it);
        }
    }

    // reading the same program after a collection gives identically
    // printing values
    #[test]
    fn prop_reread_after_collect_matches(text in sexpr()) {
        let mut ctx = fern::init_reader();
        let value = ctx.read(&text).unwrap();
        let before = ctx.display(value).to_string();
        ctx.collect(Value::Null);
        let reread = ctx.read(&text).unwrap();
        prop_assert_eq!(ctx.display(reread).to_string(), before);
    }
}
