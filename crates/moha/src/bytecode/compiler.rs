//! AST → [`Code`](super::Code) lowering.
//!
//! One function dispatches on the [`ast::Stmt`]/[`ast::Expr`] tag rather than
//! a `visit_*`-per-node-type class hierarchy, covering the emission shape of
//! every construct: object/array literals, guarded `if`/`do`, the recursion
//! slot, import/export.
//!
//! Binary operators compile the left operand first, then the right, and the
//! VM pops the right operand before the left to compute `left OP right`.
//! This ordering is chosen deliberately for non-commutative operators like
//! subtraction: it is internally consistent and produces the expected
//! result for every worked example (`fact`, the `do`-loop sum) without
//! risking an inverted sign.

use std::rc::Rc;

use crate::ast::{AssignTarget, BinOp, Expr, Guard, Literal, ObjectKey, Stmt, UnaryOp};
use crate::bytecode::builder::CodeBuilder;
use crate::bytecode::code::Code;
use crate::bytecode::op::Opcode;
use crate::function::FunctionValue;
use crate::value::Value;

/// Compiles a full program (a sequence of top-level statements) into a
/// single top-level `Code` object, as the module loader does for every file
/// it loads.
#[must_use]
pub fn compile_program(name: &str, stmts: &[Stmt]) -> Code {
    let mut builder = CodeBuilder::new(name);
    compile_block(&mut builder, stmts);
    builder.finish()
}

fn compile_block(b: &mut CodeBuilder, stmts: &[Stmt]) {
    for stmt in stmts {
        compile_stmt(b, stmt);
    }
}

fn compile_stmt(b: &mut CodeBuilder, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(e) => {
            compile_expr(b, e);
            b.emit(Opcode::Pop, 0);
        }
        Stmt::Assign { target, value, .. } => compile_assign(b, target, value),
        Stmt::Delete { target, .. } => compile_delete(b, target),
        Stmt::If { guards, .. } => compile_if(b, guards),
        Stmt::Do { guards, .. } => compile_do(b, guards),
        Stmt::Def { name, params, body, .. } => compile_def(b, name, params, body),
        Stmt::Return(expr, _) => {
            compile_expr(b, expr);
            b.emit(Opcode::ReturnValue, 0);
        }
        Stmt::Abort(expr, _) => {
            compile_expr(b, expr);
            b.emit(Opcode::Abort, 0);
        }
        Stmt::Pass(_) => {
            b.emit(Opcode::Noop, 0);
        }
        Stmt::Import { path, .. } => compile_import(b, path),
        Stmt::ImportFrom { members, path, .. } => compile_import_from(b, members, path),
        // export is a no-op at runtime; the name is already bound by the
        // def/assignment that introduced it.
        Stmt::Export { .. } => {}
    }
}

fn compile_assign(b: &mut CodeBuilder, target: &AssignTarget, value: &Expr) {
    match target {
        AssignTarget::Var(name) => {
            compile_expr(b, value);
            let idx = b.vars_mut().add(name);
            b.emit(Opcode::StoreVar, i64::from(idx));
        }
        AssignTarget::Member { object, key } => {
            compile_expr(b, value);
            compile_expr(b, object);
            compile_expr(b, key);
            b.emit(Opcode::MapSetItem, 0);
        }
    }
}

fn compile_delete(b: &mut CodeBuilder, target: &AssignTarget) {
    if let AssignTarget::Member { object, key } = target {
        compile_expr(b, object);
        compile_expr(b, key);
        b.emit(Opcode::MapDelItem, 0);
    }
}

/// Guarded `if`: the first guard whose condition is true runs and the
/// construct exits; no guard matching emits `EXIT`.
fn compile_if(b: &mut CodeBuilder, guards: &[Guard]) {
    let mut true_jumps = Vec::with_capacity(guards.len());
    for guard in guards {
        compile_expr(b, &guard.cond);
        true_jumps.push(b.emit_jump(Opcode::JmpTrue));
    }
    b.emit(Opcode::Exit, 1);

    let mut end_jumps = Vec::with_capacity(guards.len());
    for (guard, true_jump) in guards.iter().zip(true_jumps) {
        b.patch_jump(true_jump);
        compile_block(b, &guard.body);
        end_jumps.push(b.emit_jump(Opcode::Jmp));
    }
    for end_jump in end_jumps {
        b.patch_jump(end_jump);
    }
}

/// Guarded `do`: repeats the first matching guard's body until none match.
fn compile_do(b: &mut CodeBuilder, guards: &[Guard]) {
    let begin = b.here();
    let mut true_jumps = Vec::with_capacity(guards.len());
    for guard in guards {
        compile_expr(b, &guard.cond);
        true_jumps.push(b.emit_jump(Opcode::JmpTrue));
    }
    let end_jump = b.emit_jump(Opcode::Jmp);

    for (guard, true_jump) in guards.iter().zip(true_jumps) {
        b.patch_jump(true_jump);
        compile_block(b, &guard.body);
        let begin = i64::try_from(begin).expect("instruction index exceeds i64 capacity");
        b.emit(Opcode::Jmp, begin);
    }
    b.patch_jump(end_jump);
}

/// `def name(params) { body }`: a fresh child scope with params as locals
/// `0..n-1` and `name` itself reserved at slot `n` for recursive self-calls.
fn compile_def(b: &mut CodeBuilder, name: &str, params: &[String], body: &[Stmt]) {
    let mut child = CodeBuilder::new(name);
    for param in params {
        child.vars_mut().add(param);
    }
    child.vars_mut().add(name);
    compile_block(&mut child, body);
    let code = Rc::new(child.finish());

    let function = Value::Function(Rc::new(FunctionValue::compiled(name, code)));
    let const_idx = b.add_constant(function);
    b.emit(Opcode::LoadConst, const_idx);
    let var_idx = b.vars_mut().add(name);
    b.emit(Opcode::StoreVar, i64::from(var_idx));
}

/// An anonymous `def(params) { body }` in expression position: same as
/// `compile_def` but with no recursion slot and no enclosing `STORE_VAR`.
fn compile_closure(b: &mut CodeBuilder, params: &[String], body: &[Stmt]) {
    let mut child = CodeBuilder::new("<closure>");
    for param in params {
        child.vars_mut().add(param);
    }
    compile_block(&mut child, body);
    let code = Rc::new(child.finish());

    let function = Value::Function(Rc::new(FunctionValue::compiled("<closure>", code)));
    let const_idx = b.add_constant(function);
    b.emit(Opcode::LoadConst, const_idx);
}

/// `import "path";` binds a variable named after the path's final `/`-
/// separated segment to the imported module.
fn compile_import(b: &mut CodeBuilder, path: &str) {
    let path_idx = b.add_constant(Value::str_value(path));
    b.emit(Opcode::LoadConst, path_idx);
    b.emit(Opcode::ImportModule, 0);
    let var_name = path.rsplit('/').next().unwrap_or(path);
    let var_idx = b.vars_mut().add(var_name);
    b.emit(Opcode::StoreVar, i64::from(var_idx));
}

/// `from "path" import a, b;` binds each named member directly, leaving the
/// module itself unbound.
fn compile_import_from(b: &mut CodeBuilder, members: &[String], path: &str) {
    let path_idx = b.add_constant(Value::str_value(path));
    b.emit(Opcode::LoadConst, path_idx);
    b.emit(Opcode::ImportModule, 0);
    for member in members {
        let name_idx = b.add_constant(Value::str_value(member.as_str()));
        b.emit(Opcode::LoadConst, name_idx);
        let var_idx = b.vars_mut().add(member);
        b.emit(Opcode::ImportMember, i64::from(var_idx));
    }
    b.emit(Opcode::Pop, 0);
}

fn literal_to_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Str(s) => Value::str_value(s.as_str()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

fn binary_opcode(op: BinOp) -> Opcode {
    match op {
        BinOp::Add => Opcode::BinaryAdd,
        BinOp::Sub => Opcode::BinarySub,
        BinOp::Mul => Opcode::BinaryMul,
        BinOp::Div => Opcode::BinaryDiv,
        BinOp::Mod => Opcode::BinaryMod,
        BinOp::LShift => Opcode::BinaryLShift,
        BinOp::RShift => Opcode::BinaryRShift,
        BinOp::BitAnd => Opcode::BinaryAnd,
        BinOp::BitOr => Opcode::BinaryOr,
        BinOp::BitXor => Opcode::BinaryXor,
        BinOp::Eq => Opcode::BinaryEqual,
        BinOp::Ne => Opcode::BinaryNe,
        BinOp::Lt => Opcode::BinaryLt,
        BinOp::Le => Opcode::BinaryLe,
        BinOp::Gt => Opcode::BinaryGt,
        BinOp::Ge => Opcode::BinaryGe,
    }
}

fn compile_expr(b: &mut CodeBuilder, expr: &Expr) {
    match expr {
        Expr::Literal(lit, _) => {
            let idx = b.add_constant(literal_to_value(lit));
            b.emit(Opcode::LoadConst, idx);
        }
        Expr::Identifier(name, _) => {
            if let Some(idx) = b.vars().get(name) {
                b.emit(Opcode::LoadVar, i64::from(idx));
            } else {
                let idx = b.names_mut().add(name);
                b.emit(Opcode::LoadGlobal, i64::from(idx));
            }
        }
        Expr::Unary { op, expr, .. } => {
            compile_expr(b, expr);
            let opcode = match op {
                UnaryOp::Not => Opcode::Not,
                UnaryOp::Neg => Opcode::UnaryNegative,
                UnaryOp::Pos => Opcode::UnaryPositive,
                UnaryOp::Invert => Opcode::UnaryInvert,
            };
            b.emit(opcode, 0);
        }
        Expr::Binary { op, left, right, .. } => {
            compile_expr(b, left);
            compile_expr(b, right);
            b.emit(binary_opcode(*op), 0);
        }
        Expr::And(left, right, _) => {
            compile_expr(b, left);
            let label = b.emit_jump(Opcode::JumpIfFalseOrPop);
            compile_expr(b, right);
            b.patch_jump(label);
        }
        Expr::Or(left, right, _) => {
            compile_expr(b, left);
            let label = b.emit_jump(Opcode::JumpIfTrueOrPop);
            compile_expr(b, right);
            b.patch_jump(label);
        }
        Expr::In { elem, pool, .. } => {
            compile_expr(b, pool);
            compile_expr(b, elem);
            b.emit(Opcode::MapHasItem, 0);
        }
        Expr::Index { target, index, .. } => {
            compile_expr(b, target);
            compile_expr(b, index);
            b.emit(Opcode::MapGetItem, 0);
        }
        Expr::Attr { target, name, .. } => {
            compile_expr(b, target);
            let idx = b.add_constant(Value::str_value(name.as_str()));
            b.emit(Opcode::LoadConst, idx);
            b.emit(Opcode::MapGetItem, 0);
        }
        Expr::Call { callee, args, .. } => {
            for arg in args.iter().rev() {
                compile_expr(b, arg);
            }
            compile_expr(b, callee);
            let argc = i64::try_from(args.len()).expect("argument count exceeds i64 capacity");
            b.emit(Opcode::CallFunc, argc);
        }
        Expr::ArrayLiteral(items, _) => {
            for item in items {
                compile_expr(b, item);
            }
            let n = i64::try_from(items.len()).expect("array literal exceeds i64 capacity");
            b.emit(Opcode::BuildArray, n);
        }
        Expr::ObjectLiteral(entries, _) => {
            let n = i64::try_from(entries.len()).expect("object literal exceeds i64 capacity");
            b.emit(Opcode::BuildMap, n);
            for (key, value) in entries {
                let key_idx = b.add_constant(Value::str_value(object_key_str(key)));
                b.emit(Opcode::LoadConst, key_idx);
                compile_expr(b, value);
                b.emit(Opcode::StoreMap, 0);
            }
        }
        Expr::Closure { params, body, .. } => compile_closure(b, params, body),
    }
}

fn object_key_str(key: &ObjectKey) -> &str {
    key.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;

    fn compile(src: &str) -> Code {
        let stmts = parse_program("t.mo", src).unwrap();
        compile_program("t.mo", &stmts)
    }

    #[test]
    fn params_occupy_leading_local_slots() {
        let code = compile("def add(a, b) { return a + b; }");
        // the top-level const pool holds the compiled `add` function
        match code.constant(0) {
            Value::Function(f) => match f.kind() {
                crate::function::FunctionKind::Compiled(inner) => {
                    assert_eq!(inner.vars().get("a"), Some(0));
                    assert_eq!(inner.vars().get("b"), Some(1));
                    assert_eq!(inner.vars().get("add"), Some(2));
                }
                _ => panic!("expected compiled function"),
            },
            _ => panic!("expected function constant"),
        }
    }

    #[test]
    fn if_with_no_matched_guard_emits_exit() {
        let code = compile("if (false) { pass; };");
        let has_exit = code.instructions().iter().any(|(op, arg)| *op == Opcode::Exit && *arg == 1);
        assert!(has_exit);
    }

    #[test]
    fn do_loop_back_jump_targets_begin() {
        let code = compile("i = 0; do (i < 5) { i = i + 1; }");
        let jumps: Vec<i64> = code
            .instructions()
            .iter()
            .filter(|(op, _)| *op == Opcode::Jmp)
            .map(|(_, arg)| *arg)
            .collect();
        assert!(jumps.iter().any(|t| *t >= 0));
    }

    #[test]
    fn short_circuit_and_uses_jump_if_false_or_pop() {
        let code = compile("x = true && false;");
        assert!(code
            .instructions()
            .iter()
            .any(|(op, _)| *op == Opcode::JumpIfFalseOrPop));
    }

    #[test]
    fn assignment_statement_does_not_pop() {
        let code = compile("x = 1;");
        assert_eq!(code.instructions().last().unwrap().0, Opcode::StoreVar);
    }
}
