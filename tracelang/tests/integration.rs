//! Integration tests for the TraceLang pipeline
//!
//! Tests the full path from source text to program output and trace report:
//! - Lexing and parsing diagnostics
//! - Interpreter execution
//! - Trace recording and report emission

use std::path::PathBuf;

use tracelang::interp::{Environment, ErrorKind, Interpreter, Value};
use tracelang::lexer::tokenize;
use tracelang::parser::parse;
use tracelang::run::{run_source, RunConfig, RunError};

/// Helper: lex, parse and interpret a program, capturing its output
fn interpret(source: &str) -> (Interpreter<Vec<u8>>, Result<(), tracelang::RuntimeError>) {
    let lexed = tokenize(source);
    assert!(!lexed.has_errors(), "lex errors: {:?}", lexed.errors);
    let ast = parse("test.tl", source, lexed.tokens).expect("parse failed");
    let mut interp = Interpreter::with_output(Vec::new());
    let env = Environment::new().into_ref();
    let result = interp.run(&ast, &env);
    (interp, result)
}

/// Helper: run a program that must succeed and return what it printed
fn output_of(source: &str) -> String {
    let (interp, result) = interpret(source);
    if let Err(e) = result {
        panic!("interpreter failed: {e}");
    }
    String::from_utf8(interp.into_output()).expect("utf-8 output")
}

/// Helper: run a program that must fail and return the error kind
fn error_kind(source: &str) -> ErrorKind {
    match interpret(source).1 {
        Ok(()) => panic!("program unexpectedly succeeded"),
        Err(e) => e.kind,
    }
}

/// Unique report path under the system temp directory
fn temp_report(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tracelang-{tag}-{}.txt", std::process::id()))
}

// ============================================
// End-to-end scenarios
// ============================================

const LOOP_PROGRAM: &str = "trace int x = 0;\nfor (int i = 0; i < 3; i = i + 1) { x = x + i; }\nprint(x);\n";

#[test]
fn test_loop_program_output_and_history() {
    let (interp, result) = interpret(LOOP_PROGRAM);
    assert!(result.is_ok());
    assert_eq!(String::from_utf8_lossy(interp.output()), "3\n");
    assert_eq!(
        interp.trace().history("x"),
        Some(&[Value::Int(0), Value::Int(0), Value::Int(1), Value::Int(3)][..])
    );
}

#[test]
fn test_loop_program_report_file() {
    let path = temp_report("loop");
    let config = RunConfig::new("loop.tl").trace_path(&path);
    let outcome = run_source("loop.tl", LOOP_PROGRAM, &config, Vec::new()).expect("run failed");
    assert!(outcome.report_written);

    let report = std::fs::read_to_string(&path).expect("report written");
    let _ = std::fs::remove_file(&path);

    let expected = format!(
        "{}\nTrace.txt:\n\nMain -> x 0\nMain@1 x 0\nMain@2 x 1\nMain@3 x 3\n\nx: 3\n",
        "=".repeat(38)
    );
    assert_eq!(report, expected);
}

#[test]
fn test_echo_trace_appends_report_to_output() {
    let path = temp_report("echo");
    let config = RunConfig::new("echo.tl").trace_path(&path).echo_trace(true);
    let outcome = run_source("echo.tl", "trace string s = \"a\"; s += 1; print(s);", &config, Vec::new())
        .expect("run failed");
    let _ = std::fs::remove_file(&path);

    let printed = String::from_utf8(outcome.interpreter.into_output()).unwrap();
    assert!(printed.starts_with("a1\n======"));
    assert!(printed.ends_with("s: a1\n"));
}

#[test]
fn test_no_report_without_traced_variables() {
    let path = temp_report("untraced");
    let _ = std::fs::remove_file(&path);
    let config = RunConfig::new("plain.tl").trace_path(&path);
    let outcome = run_source("plain.tl", "int x = 1; print(x);", &config, Vec::new()).expect("run failed");
    assert!(!outcome.report_written);
    assert!(!path.exists());
}

#[test]
fn test_failed_run_writes_no_report() {
    let path = temp_report("failed");
    let _ = std::fs::remove_file(&path);
    let config = RunConfig::new("fail.tl").trace_path(&path);
    let err = run_source("fail.tl", "trace int x = 1; x = x / 0;", &config, Vec::new()).err();
    assert!(matches!(err, Some(RunError::Runtime(ref e)) if e.kind == ErrorKind::DivisionByZero));
    assert!(!path.exists());
}

#[test]
fn test_syntax_error_stops_before_evaluation() {
    let config = RunConfig::new("bad.tl").trace_path(temp_report("bad"));
    let err = run_source("bad.tl", "print(1);\nprint(2) print(3);\n", &config, Vec::new()).err();
    match err {
        Some(RunError::Syntax(e)) => assert_eq!(e.line(), Some(2)),
        _ => panic!("expected a syntax error"),
    }
}

#[test]
fn test_lex_errors_are_not_fatal() {
    let config = RunConfig::new("lex.tl").trace_path(temp_report("lex"));
    let outcome = run_source("lex.tl", "int x = 1 $;\nprint(x # + 1);", &config, Vec::new()).expect("run failed");
    assert_eq!(outcome.lex_errors, 2);
    assert_eq!(String::from_utf8_lossy(outcome.interpreter.output()), "2\n");
}

// ============================================
// Functions and scoping
// ============================================

#[test]
fn test_factorial() {
    let src = "function int factorial(int n) {\n  if (n <= 1) { return 1; }\n  return n * factorial(n - 1);\n}\nprint(factorial(5));";
    assert_eq!(output_of(src), "120\n");
}

#[test]
fn test_factorial_wrong_arity() {
    let src = "function int factorial(int n) { if (n <= 1) return 1; return n * factorial(n - 1); } print(factorial());";
    assert_eq!(error_kind(src), ErrorKind::TypeMismatch);
}

#[test]
fn test_dynamic_scoping() {
    let src = "int level = 0;\n\
               function int show() { print(level); return 0; }\n\
               function int nested() { int level = 7; show(); return 0; }\n\
               show(); nested();";
    assert_eq!(output_of(src), "0\n7\n");
}

#[test]
fn test_traced_write_inside_nested_calls() {
    let src = "trace int depth = 0;\n\
               function int leaf() { depth = 2; return depth; }\n\
               function int branch() { depth = 1; return leaf(); }\n\
               print(branch());";
    let (interp, result) = interpret(src);
    assert!(result.is_ok());
    assert_eq!(
        interp.trace().lines(),
        &["Main -> depth 0", "Main -> Branch@1 depth 1", "Main -> Branch -> Leaf@2 depth 2"]
    );
    assert_eq!(interp.trace().call_stack().labels(), vec!["Main"]);
}

#[test]
fn test_traced_names_in_report_are_sorted() {
    let (interp, _) = interpret("trace int b = 2; trace int a = 1; b = 3;");
    let report = interp.trace().report().expect("report");
    let finals: Vec<&str> = report.lines().rev().take(2).collect();
    assert_eq!(finals, vec!["b: 3", "a: 1"]);
}

#[test]
fn test_array_writes_are_traced() {
    let (interp, result) = interpret("trace array<int> xs = [0, 0]; xs[1] = 5; print(length(xs));");
    assert!(result.is_ok());
    assert_eq!(interp.trace().lines().last().map(String::as_str), Some("Main@1 xs [0, 5]"));
}

// ============================================
// Runtime errors
// ============================================

#[test]
fn test_runtime_error_kinds() {
    assert_eq!(error_kind("print(missing);"), ErrorKind::UndefinedReference);
    assert_eq!(error_kind("nothing();"), ErrorKind::UndefinedReference);
    assert_eq!(error_kind("int a = 1; a[0] = 2;"), ErrorKind::TypeMismatch);
    assert_eq!(error_kind("array<int> a = [1, 2]; print(a[2]);"), ErrorKind::IndexOutOfBounds);
    assert_eq!(error_kind("float f = 2.5 / 0;"), ErrorKind::DivisionByZero);
}

#[test]
fn test_runtime_error_points_at_statement() {
    let src = "int a = 1;\nprint(a / 0);\n";
    let (_, result) = interpret(src);
    let err = result.unwrap_err();
    let span = err.span.expect("span attached");
    assert_eq!(&src[span.start..span.end], "print(a / 0);");
}

#[test]
fn test_output_before_failure_is_kept() {
    let (interp, result) = interpret("print(\"before\"); print(1 / 0); print(\"after\");");
    assert!(result.is_err());
    assert_eq!(String::from_utf8_lossy(interp.output()), "before\n");
}

// ============================================
// Values and printing
// ============================================

#[test]
fn test_string_concatenation() {
    assert_eq!(output_of("print(\"x\" + 3); print(3 + \"x\");"), "x3\n3x\n");
}

#[test]
fn test_escape_sequences_are_decoded() {
    assert_eq!(output_of(r#"print("a\tb\n\"c\"\\");"#), "a\tb\n\"c\"\\\n");
}

#[test]
fn test_print_formats() {
    assert_eq!(
        output_of("print(1.0); print(true); print([1, 2]); print([\"a\"]); float f; print(f);"),
        "1.0\ntrue\n[1, 2]\n[\"a\"]\n0.0\n"
    );
}

#[test]
fn test_prefix_operators_evaluate_nested() {
    assert_eq!(output_of("print(!-1); print(!!-1);"), "false\ntrue\n");
    // parses as -(!0); negating a bool is a runtime type error
    assert_eq!(error_kind("print(-!0);"), ErrorKind::TypeMismatch);
}

#[test]
fn test_large_float_keeps_fraction() {
    assert_eq!(output_of("print(100000000000000000000.0);"), "100000000000000000000.0\n");
}

#[test]
fn test_while_and_dangling_else() {
    let src = "int i = 0; int odd = 0;\n\
               while (i < 5) { if (i % 2 == 1) if (i > 2) odd = odd + 10; else odd = odd + 1; i++; }\n\
               print(odd);";
    // i = 1 → +1, i = 3 → +10
    assert_eq!(output_of(src), "11\n");
}
