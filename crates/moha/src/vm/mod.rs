//! The bytecode interpreter's main dispatch loop.
//!
//! A single flat `while` loop over `(frame, pc)`: one `moha` function call
//! is one push onto a locally-owned `frame_stack`, not a Rust-level call,
//! so `moha` call depth is bounded by [`RecursionGuard`] rather than the
//! host stack. The one exception is `IMPORT_MODULE`, which genuinely
//! recurses into this same function (via
//! [`crate::module::ModuleLoader::load`]) to run the imported file to
//! completion before resuming — a nested import is a distinct top-level
//! program, not a call frame, so it doesn't belong on `frame_stack`.
//!
//! `EXIT` and falling off the end of a function without an explicit
//! `return` are the same event here: both just set `pc = code.len()`. The
//! loop's post-dispatch check (`pc >= code.len()`) then either pops
//! `frame_stack` and resumes the caller with an implicit `null` return, or —
//! if `frame_stack` is empty — ends the run. This gives `if` with no
//! matched guard its asymmetric behavior (abort the *function*, not the
//! program) without special-casing `EXIT` in the dispatch match itself.

mod binary;
mod call;
mod collections;
mod unary;

use std::rc::Rc;

use crate::bytecode::{Code, Opcode};
use crate::error::{ExcKind, RunError};
use crate::function::{BuiltinKind, FunctionValue};
use crate::io::PrintWriter;
use crate::module::ModuleLoader;
use crate::namespace::Frame;
use crate::resource::{RecursionGuard, ResourceLimits};
use crate::tracer::VmTracer;
use crate::value::Value;

/// Runs `code` as a top-level program (or a module body) to completion and
/// returns its finished top-level [`Frame`], so the caller (the module
/// loader, or the CLI driver for the entry file) can read its locals back
/// out as a namespace.
pub fn run<P: PrintWriter, T: VmTracer>(
    code: Rc<Code>,
    loader: &mut ModuleLoader,
    print: &mut P,
    tracer: &mut T,
    limits: ResourceLimits,
    recursion: &mut RecursionGuard,
) -> Result<Frame, RunError> {
    let mut frame = Frame::new(code);
    let mut frame_stack: Vec<(Frame, usize)> = Vec::new();
    let mut pc: usize = 0;

    loop {
        if pc >= frame.code().len() {
            let Some((caller, return_pc)) = frame_stack.pop() else {
                return Ok(frame);
            };
            recursion.exit();
            tracer.on_return(recursion.depth());
            frame = caller;
            pc = return_pc;
            frame.push(Value::Null);
            continue;
        }

        let (opcode, arg) = frame.code().instructions()[pc];
        tracer.on_instruction(pc, opcode, frame.stack_depth());
        pc += 1;

        match opcode {
            Opcode::Pop => {
                frame.pop();
            }
            Opcode::Noop => {}
            Opcode::Exit => pc = frame.code().len(),
            Opcode::Abort => {
                let value = frame.pop();
                return Err(RunError::new(ExcKind::Abort, value.to_display_string()));
            }
            Opcode::LoadConst => {
                let value = frame.code().constant(arg).clone();
                frame.push(value);
            }
            Opcode::LoadVar => {
                let value = frame.local(local_index(arg));
                frame.push(value);
            }
            Opcode::StoreVar => {
                let value = frame.pop();
                frame.set_local(local_index(arg), value);
            }
            Opcode::LoadGlobal => {
                let name = frame
                    .code()
                    .names()
                    .key_at(local_index(arg))
                    .expect("name index came from this code's own compilation")
                    .to_owned();
                let value = resolve_global(&frame_stack, &name)?;
                frame.push(value);
            }
            Opcode::BuildMap => frame.push(collections::build_map()),
            Opcode::BuildArray => {
                let n = arg as usize;
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(frame.pop());
                }
                items.reverse();
                frame.push(collections::build_array(items));
            }
            Opcode::StoreMap => {
                let value = frame.pop();
                let key = frame.pop();
                collections::store_map(frame.peek(), &key, value)?;
            }
            Opcode::MapGetItem => {
                let key = frame.pop();
                let obj = frame.pop();
                frame.push(collections::map_get_item(obj, key)?);
            }
            Opcode::MapSetItem => {
                let key = frame.pop();
                let obj = frame.pop();
                let value = frame.pop();
                collections::map_set_item(value, obj, key)?;
            }
            Opcode::MapDelItem => {
                let key = frame.pop();
                let obj = frame.pop();
                collections::map_del_item(obj, key)?;
            }
            Opcode::MapHasItem => {
                let elem = frame.pop();
                let container = frame.pop();
                frame.push(collections::map_has_item(&container, &elem)?);
            }
            Opcode::CallFunc => {
                let argc = arg as usize;
                let (callee, args) = call::pop_call(&mut frame, argc)?;
                match call::invoke(&callee, args, print)? {
                    call::CallOutcome::Value(result) => frame.push(result),
                    call::CallOutcome::Enter(callee_frame) => {
                        recursion.enter(limits)?;
                        tracer.on_call(recursion.depth(), argc);
                        frame_stack.push((std::mem::replace(&mut frame, *callee_frame), pc));
                        pc = 0;
                    }
                }
            }
            Opcode::ReturnValue => {
                let retval = frame.pop();
                let Some((caller, return_pc)) = frame_stack.pop() else {
                    // A `return` at the outermost frame terminates the
                    // program instead of returning to a (nonexistent) caller.
                    return Ok(frame);
                };
                recursion.exit();
                tracer.on_return(recursion.depth());
                frame = caller;
                pc = return_pc;
                frame.push(retval);
            }
            Opcode::Jmp => pc = arg as usize,
            Opcode::JmpTrue => {
                if frame.pop().is_truthy() {
                    pc = arg as usize;
                }
            }
            Opcode::JumpIfFalseOrPop => {
                if frame.peek().is_truthy() {
                    frame.pop();
                } else {
                    pc = arg as usize;
                }
            }
            Opcode::JumpIfTrueOrPop => {
                if frame.peek().is_truthy() {
                    pc = arg as usize;
                } else {
                    frame.pop();
                }
            }
            Opcode::BinaryAdd => binary_op(&mut frame, binary::add)?,
            Opcode::BinarySub => binary_op(&mut frame, binary::sub)?,
            Opcode::BinaryMul => binary_op(&mut frame, binary::mul)?,
            Opcode::BinaryDiv => binary_op(&mut frame, binary::div)?,
            Opcode::BinaryMod => binary_op(&mut frame, binary::modulo)?,
            Opcode::BinaryLShift => binary_op(&mut frame, binary::lshift)?,
            Opcode::BinaryRShift => binary_op(&mut frame, binary::rshift)?,
            Opcode::BinaryAnd => binary_op(&mut frame, binary::bitand)?,
            Opcode::BinaryOr => binary_op(&mut frame, binary::bitor)?,
            Opcode::BinaryXor => binary_op(&mut frame, binary::bitxor)?,
            Opcode::BinaryEqual => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(binary::equal(&left, &right));
            }
            Opcode::BinaryNe => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(binary::not_equal(&left, &right));
            }
            Opcode::BinaryLt => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(Value::Bool(binary::less_than(&left, &right)?));
            }
            Opcode::BinaryGt => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(Value::Bool(binary::greater_than(&left, &right)?));
            }
            Opcode::BinaryLe => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(binary::less_or_equal(&left, &right)?);
            }
            Opcode::BinaryGe => {
                let right = frame.pop();
                let left = frame.pop();
                frame.push(binary::greater_or_equal(&left, &right)?);
            }
            Opcode::UnaryNegative => {
                let value = frame.pop();
                frame.push(unary::negative(value)?);
            }
            Opcode::UnaryPositive => {
                let value = frame.pop();
                frame.push(unary::positive(value)?);
            }
            Opcode::UnaryInvert => {
                let value = frame.pop();
                frame.push(unary::invert(value)?);
            }
            Opcode::Not | Opcode::UnaryNot => {
                let value = frame.pop();
                frame.push(unary::not(&value));
            }
            Opcode::ImportModule => {
                let path = frame.pop();
                let Value::Str(path) = path else {
                    return Err(RunError::type_error(format!("import path must be a string, got {}", path.type_name())));
                };
                let module = loader.load(&path, limits, recursion, print, tracer)?;
                frame.push(Value::Module(module));
            }
            Opcode::ImportMember => {
                let name = frame.pop();
                let Value::Str(name) = name else {
                    return Err(RunError::type_error(format!("import member name must be a string, got {}", name.type_name())));
                };
                let Value::Module(module) = frame.peek() else {
                    return Err(RunError::type_error("IMPORT_MEMBER requires a module on top of the stack"));
                };
                let name_str = name.to_string();
                let value = module
                    .namespace
                    .borrow()
                    .get(&name_str)
                    .cloned()
                    .ok_or_else(|| RunError::index_error(format!("module has no member: {name_str}")))?;
                frame.set_local(local_index(arg), value);
            }
        }
    }
}

fn local_index(arg: i64) -> u32 {
    u32::try_from(arg).expect("negative or oversized slot index: malformed bytecode")
}

fn binary_op(frame: &mut Frame, op: impl FnOnce(Value, Value) -> Result<Value, RunError>) -> Result<(), RunError> {
    let right = frame.pop();
    let left = frame.pop();
    frame.push(op(left, right)?);
    Ok(())
}

/// `LOAD_GLOBAL`: walk `frame_stack` from the nearest caller outward, asking
/// each caller's `Code::vars()` for `name`; the first hit resolves to that
/// caller's local. No caller has it ⇒ resolve as a builtin; neither ⇒
/// `NameError`.
fn resolve_global(frame_stack: &[(Frame, usize)], name: &str) -> Result<Value, RunError> {
    for (caller, _) in frame_stack.iter().rev() {
        if let Some(idx) = caller.code().vars().get(name) {
            return Ok(caller.local(idx));
        }
    }
    if let Some(kind) = BuiltinKind::by_name(name) {
        return Ok(Value::Function(Rc::new(FunctionValue::builtin(kind))));
    }
    Err(RunError::name_error(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::compile_program;
    use crate::io::CollectStringPrint;
    use crate::parser::parse_program;
    use crate::sys::Sys;
    use crate::tracer::NoopTracer;

    fn run_source(src: &str) -> (Frame, String) {
        let stmts = parse_program("t.mo", src).unwrap();
        let code = Rc::new(compile_program("t.mo", &stmts));
        let sys = Sys::new("moha", std::env::temp_dir(), std::env::temp_dir());
        let mut loader = ModuleLoader::new(sys);
        let mut print = CollectStringPrint::new();
        let mut tracer = NoopTracer;
        let mut recursion = RecursionGuard::default();
        let frame = run(code, &mut loader, &mut print, &mut tracer, ResourceLimits::default(), &mut recursion).unwrap();
        (frame, print.into_string())
    }

    #[test]
    fn prints_evaluated_expression() {
        let (_, out) = run_source(r#"print("hi");"#);
        assert_eq!(out, "hi\n");
    }

    #[test]
    fn recursive_factorial_computes_expected_value() {
        let (_, out) = run_source(
            r#"
            def fact(n) {
              if (n <= 1) { return 1; };
              return n * fact(n - 1);
            }
            print(fact(5));
            "#,
        );
        assert_eq!(out, "120\n");
    }

    #[test]
    fn do_loop_accumulates_and_terminates() {
        let (_, out) = run_source(
            r#"
            i = 0;
            sum = 0;
            do (i < 5) {
              sum = sum + i;
              i = i + 1;
            }
            print(sum);
            "#,
        );
        assert_eq!(out, "10\n");
    }

    #[test]
    fn bound_method_call_binds_receiver() {
        let (_, out) = run_source(
            r#"
            a = [1, 2];
            a.push(3);
            print(a);
            "#,
        );
        assert_eq!(out, "[1, 2, 3]\n");
    }

    #[test]
    fn unmatched_top_level_guard_falls_off_the_end_cleanly() {
        let stmts = parse_program("t.mo", "if (false) { pass; };").unwrap();
        let code = Rc::new(compile_program("t.mo", &stmts));
        let sys = Sys::new("moha", std::env::temp_dir(), std::env::temp_dir());
        let mut loader = ModuleLoader::new(sys);
        let mut print = CollectStringPrint::new();
        let mut tracer = NoopTracer;
        let mut recursion = RecursionGuard::default();
        let frame = run(code, &mut loader, &mut print, &mut tracer, ResourceLimits::default(), &mut recursion);
        assert!(frame.is_ok(), "an unmatched guard at the top level just falls off the end");
    }

    #[test]
    fn unresolved_name_is_a_name_error() {
        let stmts = parse_program("t.mo", "print(nope);").unwrap();
        let code = Rc::new(compile_program("t.mo", &stmts));
        let sys = Sys::new("moha", std::env::temp_dir(), std::env::temp_dir());
        let mut loader = ModuleLoader::new(sys);
        let mut print = CollectStringPrint::new();
        let mut tracer = NoopTracer;
        let mut recursion = RecursionGuard::default();
        let err = run(code, &mut loader, &mut print, &mut tracer, ResourceLimits::default(), &mut recursion).unwrap_err();
        assert_eq!(err.kind, ExcKind::NameError);
    }
}
