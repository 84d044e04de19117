//! `CALL_FUNC`/`RETURN_VALUE` plumbing.
//!
//! Pop the callee, pop `n` arguments, prepend a bound receiver if the
//! callee carries one, then dispatch on what kind of callable it is.
//! Compiled calls push a new [`Frame`] for the interpreter loop to step
//! into; builtins and instance methods are host-side functions that
//! produce a result immediately, with no frame of their own.

use std::rc::Rc;

use crate::builtins;
use crate::error::RunError;
use crate::function::{FunctionKind, FunctionValue, InstanceMethodKind};
use crate::io::PrintWriter;
use crate::namespace::Frame;
use crate::value::Value;

/// What dispatching a `CALL_FUNC` produces: either a value computed
/// immediately (builtin or instance method), or a fresh [`Frame`] the
/// caller must push onto the frame stack and begin executing from `pc = 0`.
pub enum CallOutcome {
    Value(Value),
    Enter(Box<Frame>),
}

/// Pops the callee and its `argc` arguments off `frame`'s operand stack, in
/// the order `CALL_FUNC` expects: the arguments were compiled right-to-left
/// then the callee, so popping the callee first and then popping `argc`
/// times yields `args[0]` first — no reversal needed. If the callee
/// carries a bound receiver, it is prepended as `args[0]`, pushing the
/// explicit arguments back by one.
pub fn pop_call(frame: &mut Frame, argc: usize) -> Result<(Rc<FunctionValue>, Vec<Value>), RunError> {
    let callee = frame.pop();
    let Value::Function(callee) = callee else {
        return Err(RunError::type_error(format!("'{}' object is not callable", callee.type_name())));
    };

    let mut args = Vec::with_capacity(argc + 1);
    for _ in 0..argc {
        args.push(frame.pop());
    }
    if let Some(receiver) = callee.receiver() {
        args.insert(0, receiver.clone());
    }
    Ok((callee, args))
}

/// Dispatches a resolved callee against its already-bound `args`. Builtins
/// and instance methods are fully resolved here; a `Compiled` callee
/// produces a fresh frame for the caller to step into.
pub fn invoke(callee: &Rc<FunctionValue>, args: Vec<Value>, out: &mut impl PrintWriter) -> Result<CallOutcome, RunError> {
    match callee.kind() {
        FunctionKind::Builtin(kind) => {
            check_arity(callee.name(), args.len(), &[builtins::arity(*kind)])?;
            builtins::call(*kind, args, out).map(CallOutcome::Value)
        }
        FunctionKind::InstanceMethod(kind) => {
            check_arity(callee.name(), args.len(), kind.accepted_arities())?;
            call_instance_method(*kind, args).map(CallOutcome::Value)
        }
        FunctionKind::Compiled(code) => {
            let mut frame = Frame::new(Rc::clone(code));
            let numvars = code.numvars();
            let argc = args.len();
            for (index, arg) in args.into_iter().enumerate() {
                frame.set_local(u32::try_from(index).expect("argument count exceeds u32"), arg);
            }
            // Recursion slot: an extra local beyond the params holds an
            // unbound self-reference, not the callee as it was actually
            // invoked, so a bound method recursing on itself doesn't keep
            // re-binding its receiver on every call.
            if numvars > argc {
                let self_ref = Value::Function(Rc::new(FunctionValue::compiled(callee.name(), Rc::clone(code))));
                frame.set_local(u32::try_from(argc).expect("argument count exceeds u32"), self_ref);
            }
            Ok(CallOutcome::Enter(Box::new(frame)))
        }
    }
}

fn check_arity(name: &str, got: usize, accepted: &[usize]) -> Result<(), RunError> {
    if accepted.contains(&got) {
        Ok(())
    } else {
        Err(RunError::arity_error(format!("{name}() takes {accepted:?} argument(s), got {got}")))
    }
}

fn call_instance_method(kind: InstanceMethodKind, mut args: Vec<Value>) -> Result<Value, RunError> {
    match kind {
        InstanceMethodKind::ArrayPush => {
            let elem = args.pop().expect("arity checked");
            let Value::Array(items) = &args[0] else {
                return Err(RunError::type_error("push() receiver must be an array"));
            };
            items.borrow_mut().push(elem);
            Ok(Value::Null)
        }
        InstanceMethodKind::ArrayPop => {
            let Value::Array(items) = &args[0] else {
                return Err(RunError::type_error("pop() receiver must be an array"));
            };
            items.borrow_mut().pop().ok_or_else(|| RunError::index_error("pop from empty array"))
        }
        InstanceMethodKind::ArrayIndex => {
            let key = args.pop().expect("arity checked");
            let Value::Array(items) = &args[0] else {
                return Err(RunError::type_error("index() receiver must be an array"));
            };
            let items = items.borrow();
            let idx = super::collections::array_index(items.len(), &key)?;
            Ok(items[idx].clone())
        }
        InstanceMethodKind::ArrayLength => {
            let Value::Array(items) = &args[0] else {
                return Err(RunError::type_error("length() receiver must be an array"));
            };
            Ok(Value::Int(items.borrow().len() as i64))
        }
        InstanceMethodKind::StringIndex => {
            let key = args.pop().expect("arity checked");
            let Value::Str(s) = &args[0] else {
                return Err(RunError::type_error("index() receiver must be a string"));
            };
            let idx = super::collections::array_index(s.chars().count(), &key)?;
            Ok(Value::str_value(s.chars().nth(idx).expect("index checked above").to_string()))
        }
        InstanceMethodKind::StringLength => {
            let Value::Str(s) = &args[0] else {
                return Err(RunError::type_error("length() receiver must be a string"));
            };
            Ok(Value::Int(s.chars().count() as i64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectStringPrint;

    #[test]
    fn calling_a_non_function_is_a_type_error() {
        let mut frame = Frame::new(Rc::new(crate::bytecode::compile_program("t", &[])));
        frame.push(Value::Int(1));
        let err = pop_call(&mut frame, 0).unwrap_err();
        assert_eq!(err.kind, crate::error::ExcKind::TypeError);
    }

    #[test]
    fn push_on_non_array_is_a_type_error() {
        let mut out = CollectStringPrint::new();
        let callee = Rc::new(FunctionValue::instance_method(InstanceMethodKind::ArrayPush));
        let err = invoke(&callee, vec![Value::Int(1), Value::Int(2)], &mut out).unwrap_err();
        assert_eq!(err.kind, crate::error::ExcKind::TypeError);
    }

    #[test]
    fn array_push_mutates_the_shared_array() {
        let mut out = CollectStringPrint::new();
        let callee = Rc::new(FunctionValue::instance_method(InstanceMethodKind::ArrayPush));
        let arr = Value::array(vec![Value::Int(1)]);
        invoke(&callee, vec![arr.clone(), Value::Int(2)], &mut out).unwrap();
        assert_eq!(arr.to_display_string(), "[1, 2]");
    }

    #[test]
    fn wrong_arity_on_a_builtin_is_an_arity_error() {
        let mut out = CollectStringPrint::new();
        let callee = Rc::new(FunctionValue::builtin(crate::function::BuiltinKind::Print));
        let err = invoke(&callee, vec![Value::Int(1), Value::Int(2)], &mut out).unwrap_err();
        assert_eq!(err.kind, crate::error::ExcKind::ArityError);
    }
}
