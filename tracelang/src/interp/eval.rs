//! Tree-walking evaluator

use super::env::{child_env, EnvRef};
use super::error::{InterpResult, RuntimeError};
use super::trace::{call_label, TraceRecorder};
use super::value::Value;
use crate::ast::{BinOp, Expr, FnDef, IncDecOp, Program, Spanned, Stmt, UnOp};
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Default limit on nested user-function calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Name of the builtin returning the element count of an array
const LENGTH_BUILTIN: &str = "length";

/// Outcome of executing a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Continue with the next statement
    Normal,
    /// A `return` is unwinding to the nearest enclosing call
    Return(Value),
}

/// The interpreter.
///
/// Owns everything that lives for one run: the function registry, the trace
/// recorder and the output sink. Separate instances share nothing.
pub struct Interpreter<W: Write = io::Stdout> {
    /// User-defined functions; redefinition replaces
    functions: HashMap<String, Rc<FnDef>>,
    trace: TraceRecorder,
    out: W,
    max_call_depth: usize,
    call_depth: usize,
}

impl Interpreter<io::Stdout> {
    /// Create an interpreter printing to stdout
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Create an interpreter printing to `out`
    pub fn with_output(out: W) -> Self {
        Interpreter {
            functions: HashMap::new(),
            trace: TraceRecorder::new(),
            out,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            call_depth: 0,
        }
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn trace(&self) -> &TraceRecorder {
        &self.trace
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run a program in `env`. A top-level `return` ends the program early.
    pub fn run(&mut self, program: &Program, env: &EnvRef) -> InterpResult<()> {
        let flow = self.exec_block(&program.stmts, env);
        self.out.flush()?;
        if let Flow::Return(value) = flow? {
            log::debug!("program returned {value} at top level");
        }
        Ok(())
    }

    /// Execute statements in order, stopping at the first `return`
    pub fn exec_block(&mut self, stmts: &[Spanned<Stmt>], env: &EnvRef) -> InterpResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, env)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// Execute one statement with automatic stack growth
    pub fn exec_stmt(&mut self, stmt: &Spanned<Stmt>, env: &EnvRef) -> InterpResult<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.exec_stmt_inner(&stmt.node, env)
        })
        .map_err(|e| e.with_span(stmt.span))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, env: &EnvRef) -> InterpResult<Flow> {
        match stmt {
            Stmt::Block(stmts) => return self.exec_block(stmts, env),

            Stmt::Declare {
                traced,
                ty,
                name,
                init,
            } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::default_for(ty),
                };
                env.borrow_mut().define(name.as_str(), value.clone());
                if *traced {
                    self.trace.register(name);
                    self.trace.record(name, &value);
                }
            }

            Stmt::Assign { name, value } => {
                let value = self.eval_expr(value, env)?;
                env.borrow_mut().assign(name, value.clone());
                self.trace.record(name, &value);
            }

            Stmt::ArrayAssign { name, index, value } => {
                let index = self.eval_expr(index, env)?;
                let value = self.eval_expr(value, env)?;
                let mut items = match lookup(env, name)? {
                    Value::Array(items) => items,
                    other => return Err(RuntimeError::type_error("array", other.type_name())),
                };
                let slot = checked_index(&index, items.len())?;
                items[slot] = value;
                let updated = Value::Array(items);
                env.borrow_mut().set(name, updated.clone());
                self.trace.record(name, &updated);
            }

            Stmt::CompoundAssign { name, op, value } => {
                let current = lookup(env, name)?;
                let rhs = self.eval_expr(value, env)?;
                let updated = binary(op.bin_op(), current, rhs)?;
                env.borrow_mut().set(name, updated.clone());
                self.trace.record(name, &updated);
            }

            Stmt::IncDec { name, op } => {
                let current = lookup(env, name)?;
                let op = match op {
                    IncDecOp::Inc => BinOp::Add,
                    IncDecOp::Dec => BinOp::Sub,
                };
                let updated = binary(op, current, Value::Int(1))?;
                env.borrow_mut().set(name, updated.clone());
                self.trace.record(name, &updated);
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    return self.exec_stmt(then_branch, env);
                } else if let Some(else_branch) = else_branch {
                    return self.exec_stmt(else_branch, env);
                }
            }

            Stmt::While { cond, body } => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_stmt(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                let scope = child_env(env);
                if let Some(init) = init {
                    self.exec_stmt(init, &scope)?;
                }
                while self.eval_expr(cond, &scope)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_stmt(body, &scope)? {
                        return Ok(Flow::Return(value));
                    }
                    if let Some(update) = update {
                        self.exec_stmt(update, &scope)?;
                    }
                }
            }

            Stmt::FunctionDecl(def) => {
                log::debug!("defining function `{}` ({} params)", def.name, def.params.len());
                if self
                    .functions
                    .insert(def.name.clone(), Rc::new(def.clone()))
                    .is_some()
                {
                    log::warn!("function `{}` redefined; the earlier definition is replaced", def.name);
                }
            }

            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Unit,
                };
                return Ok(Flow::Return(value));
            }

            Stmt::Print(expr) => {
                let value = self.eval_expr(expr, env)?;
                writeln!(self.out, "{value}")?;
            }

            Stmt::Expr(expr) => {
                self.eval_expr(expr, env)?;
            }
        }
        Ok(Flow::Normal)
    }

    /// Evaluate an expression with automatic stack growth
    pub fn eval_expr(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &EnvRef) -> InterpResult<Value> {
        match expr {
            Expr::IntLit(n) => Ok(Value::Int(*n)),
            Expr::FloatLit(f) => Ok(Value::Float(*f)),
            Expr::StringLit(s) => Ok(Value::Str(s.clone())),
            Expr::BoolLit(b) => Ok(Value::Bool(*b)),

            Expr::Var(name) => lookup(env, name),

            Expr::ArrayLit(elems) => {
                let items = elems
                    .iter()
                    .map(|e| self.eval_expr(e, env))
                    .collect::<InterpResult<Vec<_>>>()?;
                Ok(Value::Array(items))
            }

            Expr::Index { name, index } => {
                let index = self.eval_expr(index, env)?;
                match lookup(env, name)? {
                    Value::Array(mut items) => {
                        let slot = checked_index(&index, items.len())?;
                        Ok(items.swap_remove(slot))
                    }
                    other => Err(RuntimeError::type_error("array", other.type_name())),
                }
            }

            Expr::Binary { left, op, right } => {
                // both sides are always evaluated, `&&` and `||` included
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                binary(*op, left, right)
            }

            Expr::Unary { op, expr } => {
                let value = self.eval_expr(expr, env)?;
                match (op, value) {
                    (UnOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
                    (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
                    (UnOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
                    (UnOp::Neg, v) => Err(RuntimeError::type_error("number", v.type_name())),
                }
            }

            Expr::Call { func, args } => {
                let args = args
                    .iter()
                    .map(|a| self.eval_expr(a, env))
                    .collect::<InterpResult<Vec<_>>>()?;
                self.call(func, args, env)
            }
        }
    }

    /// Call a builtin or user-defined function with already evaluated arguments.
    ///
    /// The callee's scope is a child of `caller_env`, so free names in the body
    /// resolve against whoever is calling.
    pub fn call(&mut self, name: &str, args: Vec<Value>, caller_env: &EnvRef) -> InterpResult<Value> {
        if name == LENGTH_BUILTIN {
            return builtin_length(&args);
        }

        let def = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_function(name))?;

        if def.params.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(name, def.params.len(), args.len()));
        }
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::stack_overflow(self.max_call_depth));
        }

        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.call_function_inner(&def, args, caller_env)
        })
    }

    fn call_function_inner(&mut self, def: &FnDef, args: Vec<Value>, caller_env: &EnvRef) -> InterpResult<Value> {
        let scope = child_env(caller_env);
        for (param, arg) in def.params.iter().zip(args) {
            scope.borrow_mut().define(param.name.as_str(), arg);
        }

        let _frame = self.trace.enter(call_label(&def.name));
        self.call_depth += 1;
        log::debug!("enter `{}` (depth {})", def.name, self.call_depth);

        let result = self.exec_block(&def.body, &scope);

        self.call_depth -= 1;
        log::debug!("leave `{}`", def.name);

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Unit),
        }
    }
}

fn lookup(env: &EnvRef, name: &str) -> InterpResult<Value> {
    env.borrow()
        .get(name)
        .ok_or_else(|| RuntimeError::undefined_variable(name))
}

/// Validate `index` as an in-bounds position of a sequence of length `len`
fn checked_index(index: &Value, len: usize) -> InterpResult<usize> {
    let i = index
        .as_int()
        .ok_or_else(|| RuntimeError::type_error("int index", index.type_name()))?;
    usize::try_from(i)
        .ok()
        .filter(|&slot| slot < len)
        .ok_or_else(|| RuntimeError::index_out_of_bounds(i, len))
}

fn builtin_length(args: &[Value]) -> InterpResult<Value> {
    match args {
        [Value::Array(items)] => Ok(Value::Int(items.len() as i64)),
        [other] => Err(RuntimeError::type_error("array", other.type_name())),
        _ => Err(RuntimeError::arity_mismatch(LENGTH_BUILTIN, 1, args.len())),
    }
}

/// Apply a binary operator to two evaluated operands
pub fn binary(op: BinOp, left: Value, right: Value) -> InterpResult<Value> {
    match op {
        BinOp::Add if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) => {
            Ok(Value::Str(format!("{left}{right}")))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => arithmetic(op, &left, &right),

        BinOp::Eq => Ok(Value::Bool(left == right)),
        BinOp::Ne => Ok(Value::Bool(left != right)),

        BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let ordering = match (&left, &right) {
                (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
                (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
                (a, b) if a.is_numeric() && b.is_numeric() => {
                    a.as_float().partial_cmp(&b.as_float())
                }
                _ => {
                    return Err(RuntimeError::invalid_operands(
                        op,
                        left.type_name(),
                        right.type_name(),
                    ))
                }
            };
            // NaN compares false under every relational operator
            let result = ordering.is_some_and(|ord| match op {
                BinOp::Lt => ord.is_lt(),
                BinOp::Gt => ord.is_gt(),
                BinOp::Le => ord.is_le(),
                _ => ord.is_ge(),
            });
            Ok(Value::Bool(result))
        }

        BinOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> InterpResult<Value> {
    if !left.is_numeric() || !right.is_numeric() {
        return Err(RuntimeError::invalid_operands(
            op,
            left.type_name(),
            right.type_name(),
        ));
    }
    if matches!(op, BinOp::Div | BinOp::Mod) && right.as_float() == Some(0.0) {
        return Err(RuntimeError::division_by_zero());
    }

    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        let (a, b) = (*a, *b);
        let n = match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::Div => a.wrapping_div(b),
            _ => {
                let r = a.wrapping_rem(b);
                if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
            }
        };
        return Ok(Value::Int(n));
    }

    let (a, b) = match (left.as_float(), right.as_float()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(RuntimeError::invalid_operands(op, left.type_name(), right.type_name())),
    };
    let x = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        _ => {
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
    };
    Ok(Value::Float(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::{Environment, ErrorKind};
    use crate::lexer::tokenize;
    use crate::parser::parse;

    struct Run {
        interp: Interpreter<Vec<u8>>,
        env: EnvRef,
        result: InterpResult<()>,
    }

    impl Run {
        fn stdout(&self) -> String {
            String::from_utf8_lossy(self.interp.output()).into_owned()
        }

        fn var(&self, name: &str) -> Option<Value> {
            self.env.borrow().get(name)
        }

        fn err_kind(&self) -> Option<ErrorKind> {
            self.result.as_ref().err().map(|e| e.kind)
        }
    }

    fn run_with(source: &str, max_depth: usize) -> Run {
        let lexed = tokenize(source);
        assert!(!lexed.has_errors(), "lex errors: {:?}", lexed.errors);
        let program = parse("test.tl", source, lexed.tokens).expect("parse");
        let mut interp = Interpreter::with_output(Vec::new()).with_max_call_depth(max_depth);
        let env = Environment::new().into_ref();
        let result = interp.run(&program, &env);
        Run { interp, env, result }
    }

    fn run(source: &str) -> Run {
        run_with(source, DEFAULT_MAX_CALL_DEPTH)
    }

    fn run_ok(source: &str) -> Run {
        let run = run(source);
        if let Err(e) = &run.result {
            panic!("run failed: {e}");
        }
        run
    }

    // ---- declarations and assignment ----

    #[test]
    fn test_defaults_for_uninitialized_declarations() {
        let r = run_ok("int i; float f; string s; bool b; array<int> a; print(f);");
        assert_eq!(r.var("i"), Some(Value::Int(0)));
        assert_eq!(r.var("s"), Some(Value::Str(String::new())));
        assert_eq!(r.var("b"), Some(Value::Bool(false)));
        assert_eq!(r.var("a"), Some(Value::Array(vec![])));
        assert_eq!(r.stdout(), "0.0\n");
    }

    #[test]
    fn test_assignment_to_unknown_name_declares_it() {
        let r = run_ok("y = 7;");
        assert_eq!(r.var("y"), Some(Value::Int(7)));
    }

    #[test]
    fn test_for_loop_updates_outer_binding_in_place() {
        let r = run_ok("int total = 0; for (int i = 1; i <= 4; i++) { total += i; }");
        assert_eq!(r.var("total"), Some(Value::Int(10)));
        // the loop variable lives in the loop's own scope
        assert_eq!(r.var("i"), None);
    }

    #[test]
    fn test_blocks_do_not_open_a_scope() {
        let r = run_ok("{ int inner = 1; }");
        assert_eq!(r.var("inner"), Some(Value::Int(1)));
    }

    #[test]
    fn test_compound_and_incdec() {
        let r = run_ok("int x = 10; x -= 3; x *= 2; x /= 4; x++; x++; x--;");
        assert_eq!(r.var("x"), Some(Value::Int(4)));
    }

    #[test]
    fn test_incdec_on_unbound_name_fails() {
        assert_eq!(run("n++;").err_kind(), Some(ErrorKind::UndefinedReference));
        assert_eq!(run("n += 1;").err_kind(), Some(ErrorKind::UndefinedReference));
    }

    // ---- arrays ----

    #[test]
    fn test_array_read_and_write() {
        let r = run_ok("array<int> a = [1, 2, 3]; a[1] = 20; print(a[1] + a[2]); print(length(a));");
        assert_eq!(r.var("a"), Some(Value::Array(vec![Value::Int(1), Value::Int(20), Value::Int(3)])));
        assert_eq!(r.stdout(), "23\n3\n");
    }

    #[test]
    fn test_array_bounds() {
        assert_eq!(run("array<int> a = [1]; print(a[1]);").err_kind(), Some(ErrorKind::IndexOutOfBounds));
        assert_eq!(run("array<int> a = [1]; print(a[-1]);").err_kind(), Some(ErrorKind::IndexOutOfBounds));
        assert_eq!(run("array<int> a = []; a[0] = 1;").err_kind(), Some(ErrorKind::IndexOutOfBounds));
        run_ok("array<int> a = [1, 2]; print(a[0]); a[1] = 5;");
    }

    #[test]
    fn test_array_type_checks() {
        assert_eq!(run("int a = 3; print(a[0]);").err_kind(), Some(ErrorKind::TypeMismatch));
        assert_eq!(run("array<int> a = [1]; print(a[true]);").err_kind(), Some(ErrorKind::TypeMismatch));
        assert_eq!(run("array<int> a = [1]; a[0.0] = 2;").err_kind(), Some(ErrorKind::TypeMismatch));
        assert_eq!(run("print(length(3));").err_kind(), Some(ErrorKind::TypeMismatch));
        assert_eq!(run("print(length());").err_kind(), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_arrays_are_copied_on_assignment() {
        let r = run_ok("array<int> a = [1]; array<int> b = a; b[0] = 9; print(a[0]);");
        assert_eq!(r.stdout(), "1\n");
    }

    // ---- operators ----

    #[test]
    fn test_string_concatenation_either_side() {
        let r = run_ok(r#"print("x" + 3); print(3 + "x"); print("v=" + 1.5); print("b" + true);"#);
        assert_eq!(r.stdout(), "x3\n3x\nv=1.5\nbtrue\n");
    }

    #[test]
    fn test_division_by_zero_any_numeric_kind() {
        for src in ["print(1 / 0);", "print(1.5 / 0);", "print(2 / 0.0);", "print(5 % 0);"] {
            assert_eq!(run(src).err_kind(), Some(ErrorKind::DivisionByZero), "{src}");
        }
    }

    #[test]
    fn test_integer_and_float_arithmetic() {
        let r = run_ok("print(7 / 2); print(-7 / 2); print(7 % 3); print(-7 % 3); print(1 + 0.5); print(2 * 2.0);");
        assert_eq!(r.stdout(), "3\n-3\n1\n2\n1.5\n4.0\n");
    }

    #[test]
    fn test_comparisons() {
        let r = run_ok(r#"print(1 < 2); print(2 == 2.0); print("a" < "b"); print(1 != "1"); print([1, 2] == [1, 2]);"#);
        assert_eq!(r.stdout(), "true\ntrue\ntrue\ntrue\ntrue\n");
        assert_eq!(run(r#"print(1 < "2");"#).err_kind(), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_logical_operators_evaluate_both_sides() {
        let src = "int hits = 0; \
                   function bool bump() { hits++; return true; } \
                   bool r = false && bump(); \
                   bool s = true || bump(); \
                   print(hits); print(r); print(s); print(!0);";
        let r = run_ok(src);
        assert_eq!(r.stdout(), "2\nfalse\ntrue\ntrue\n");
    }

    #[test]
    fn test_non_numeric_arithmetic_fails() {
        assert_eq!(run("print(true - 1);").err_kind(), Some(ErrorKind::TypeMismatch));
        assert_eq!(run(r#"print(-"s");"#).err_kind(), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_undefined_variable() {
        let r = run("print(nope);");
        assert_eq!(r.err_kind(), Some(ErrorKind::UndefinedReference));
        assert!(r.result.unwrap_err().span.is_some());
    }

    // ---- functions ----

    #[test]
    fn test_recursive_factorial() {
        let src = "function int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); } print(fact(5));";
        assert_eq!(run_ok(src).stdout(), "120\n");
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let src = "function int fact(int n) { return n; } print(fact());";
        assert_eq!(run(src).err_kind(), Some(ErrorKind::TypeMismatch));
        let src = "function int fact(int n) { return n; } print(fact(1, 2));";
        assert_eq!(run(src).err_kind(), Some(ErrorKind::TypeMismatch));
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(run("missing(1);").err_kind(), Some(ErrorKind::UndefinedReference));
    }

    #[test]
    fn test_call_without_return_yields_unit() {
        let r = run_ok("function int noop() { int z = 1; } print(noop());");
        assert_eq!(r.stdout(), "()\n");
    }

    #[test]
    fn test_free_names_resolve_in_caller_scope() {
        let src = "function int peek() { return secret; } \
                   function int outer() { int secret = 42; return peek(); } \
                   print(outer());";
        assert_eq!(run_ok(src).stdout(), "42\n");
    }

    #[test]
    fn test_function_can_mutate_caller_binding() {
        let r = run_ok("int count = 1; function int bump() { count = count + 1; return count; } bump(); bump();");
        assert_eq!(r.var("count"), Some(Value::Int(3)));
    }

    #[test]
    fn test_redefinition_replaces_silently() {
        let src = "function int f() { return 1; } function int f() { return 2; } print(f());";
        assert_eq!(run_ok(src).stdout(), "2\n");
    }

    #[test]
    fn test_return_inside_loops() {
        let src = "function int first_over(int limit) { \
                       for (int i = 0; i < 100; i++) { while (true) { if (i > limit) return i; i++; } } \
                       return -1; } \
                   print(first_over(3));";
        assert_eq!(run_ok(src).stdout(), "4\n");
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let r = run_ok("print(1); return; print(2);");
        assert_eq!(r.stdout(), "1\n");
    }

    #[test]
    fn test_call_depth_limit() {
        let src = "function int down(int n) { return down(n + 1); } down(0);";
        let r = run_with(src, 64);
        assert_eq!(r.err_kind(), Some(ErrorKind::StackOverflow));
        assert_eq!(r.interp.trace().call_stack().depth(), 1);
    }

    #[test]
    fn test_deep_recursion_within_limit() {
        let src = "function int sum(int n) { if (n == 0) return 0; return n + sum(n - 1); } print(sum(5000));";
        assert_eq!(run_ok(src).stdout(), "12502500\n");
    }

    // ---- tracing ----

    #[test]
    fn test_trace_history_one_entry_per_write() {
        let r = run_ok("trace int x = 0; for (int i = 0; i < 3; i = i + 1) { x = x + i; } print(x);");
        assert_eq!(r.stdout(), "3\n");
        assert_eq!(
            r.interp.trace().history("x"),
            Some(&[Value::Int(0), Value::Int(0), Value::Int(1), Value::Int(3)][..])
        );
    }

    #[test]
    fn test_trace_records_call_context() {
        let src = "trace int x = 1; \
                   function int inner() { x = 3; return 0; } \
                   function int outer() { x = 2; inner(); return 0; } \
                   outer(); x++;";
        let r = run_ok(src);
        assert_eq!(
            r.interp.trace().lines(),
            &[
                "Main -> x 1",
                "Main -> Outer@1 x 2",
                "Main -> Outer -> Inner@2 x 3",
                "Main@3 x 4",
            ]
        );
    }

    #[test]
    fn test_call_labels_popped_after_failure() {
        let r = run("function int boom() { return 1 / 0; } boom();");
        assert_eq!(r.err_kind(), Some(ErrorKind::DivisionByZero));
        assert_eq!(r.interp.trace().call_stack().labels(), vec!["Main"]);
    }

    #[test]
    fn test_untraced_variables_leave_no_report() {
        let r = run_ok("int x = 1; x = 2;");
        assert!(r.interp.trace().report().is_none());
    }
}
