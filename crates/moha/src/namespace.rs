//! Per-call activation record ("Frame") and the value operand stack.
//!
//! No closure-cell indirection, no snapshotting, no external-call return
//! queue — this language has none of those. What survives is the core idea,
//! a flat `Vec<Value>` of local slots indexed by compile-time slot number,
//! plus the per-frame operand stack the interpreter pushes and pops.

use std::rc::Rc;

use crate::bytecode::Code;
use crate::value::Value;

/// One call's activation record: the code being executed, its local slots,
/// and its value (operand) stack. Created on `CALL_FUNC`, destroyed on
/// `RETURN_VALUE`.
#[derive(Debug)]
pub struct Frame {
    code: Rc<Code>,
    locals: Vec<Value>,
    stack: Vec<Value>,
}

impl Frame {
    /// Builds a fresh frame for `code`, with `locals` sized to `code.numvars()`
    /// and filled with `Null`: params occupy the first slots, the caller
    /// fills those in after construction.
    #[must_use]
    pub fn new(code: Rc<Code>) -> Self {
        let numvars = code.numvars();
        Self {
            code,
            locals: vec![Value::Null; numvars],
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn code(&self) -> &Rc<Code> {
        &self.code
    }

    #[must_use]
    pub fn local(&self, index: u32) -> Value {
        self.locals[index as usize].clone()
    }

    pub fn set_local(&mut self, index: u32, value: Value) {
        self.locals[index as usize] = value;
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Value {
        self.stack.pop().expect("operand stack underflow: malformed bytecode")
    }

    pub fn peek(&self) -> &Value {
        self.stack.last().expect("operand stack underflow: malformed bytecode")
    }

    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}
