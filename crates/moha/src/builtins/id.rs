//! `id(v)`: an `Int` derived from `v`'s identity.
//!
//! The composite kinds (`Array`, `Object`, `Function`, `Module`, `Str`) are
//! heap-allocated behind `Rc`, so those return their pointer address.
//! Inline scalars (`Null`, `Bool`, `Int`, `Float`) have no comparable heap
//! identity and instead hash their own bit pattern, so `id(1) == id(1)`
//! holds even though no allocation backs either `1`.
use std::rc::Rc;

use crate::value::Value;

#[expect(clippy::cast_possible_wrap, reason = "identity value is opaque, sign carries no meaning")]
pub fn call(arg: &Value) -> Value {
    let id = match arg {
        Value::Array(a) => Rc::as_ptr(a) as usize,
        Value::Object(o) => Rc::as_ptr(o) as usize,
        Value::Function(f) => Rc::as_ptr(f) as usize,
        Value::Module(m) => Rc::as_ptr(m) as usize,
        Value::Str(s) => Rc::as_ptr(s) as *const u8 as usize,
        Value::Null => 0,
        Value::Bool(b) => 1 + usize::from(*b),
        Value::Int(i) => *i as usize,
        Value::Float(f) => f.to_bits() as usize,
    };
    Value::Int(id as i64)
}
