//! The runtime value model.
//!
//! No concurrency, no snapshotting across coroutine boundaries, no cycle
//! collector — composite values are plain `Rc<RefCell<_>>`, accepting that a
//! cyclic array or object leaks rather than building a tracing collector for
//! a case that doesn't otherwise come up.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::function::FunctionValue;

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<IndexMap<String, Value>>>;

/// A loaded module's exported namespace, shared by every binding that refers to it.
#[derive(Debug)]
pub struct ModuleValue {
    pub name: String,
    pub path: std::path::PathBuf,
    pub namespace: ObjectRef,
}

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Array(ArrayRef),
    Object(ObjectRef),
    Function(Rc<FunctionValue>),
    Module(Rc<ModuleValue>),
}

impl Value {
    #[must_use]
    pub fn str_value(s: impl Into<String>) -> Self {
        Self::Str(Rc::from(s.into()))
    }

    #[must_use]
    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn object(entries: IndexMap<String, Value>) -> Self {
        Self::Object(Rc::new(RefCell::new(entries)))
    }

    /// Truthiness used by `if`/`do` conditions and `!`: `null`, `false`,
    /// `0`, `0.0`, `""`, `[]`, and `{}` are falsy; everything else (including
    /// functions and modules) is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Array(a) => !a.borrow().is_empty(),
            Self::Object(o) => !o.borrow().is_empty(),
            Self::Function(_) | Self::Module(_) => true,
        }
    }

    /// The name used in `TypeError` messages and other diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Module(_) => "module",
        }
    }

    /// The `str()` builtin / string-coercion conversion.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => format_float(*f),
            Self::Str(s) => s.to_string(),
            Self::Array(a) => {
                let items: Vec<String> = a.borrow().iter().map(Value::to_display_string).collect();
                format!("[{}]", items.join(","))
            }
            Self::Object(o) => {
                let entries: Vec<String> = o
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{k}:{}", v.to_display_string()))
                    .collect();
                format!("{{{}}}", entries.join(","))
            }
            Self::Function(f) => format!("<function {}>", f.name()),
            Self::Module(m) => format!("<module {}>", m.name),
        }
    }

    /// Structural equality (`==`): numbers compare by value across
    /// Int/Float, composite values compare by deep structural equality, and
    /// functions/modules compare by identity.
    #[must_use]
    pub fn value_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.value_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|bv| bv.value_eq(v)))
            }
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Module(a), Self::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// Integral floats print with a trailing `.0` so `1.0` is distinguishable
/// from `1`.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_matches_spec_falsy_set() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::str_value("").is_truthy());
        assert!(!Value::array(vec![]).is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(Value::str_value("x").is_truthy());
    }

    #[test]
    fn float_formats_with_trailing_zero() {
        assert_eq!(Value::Float(2.0).to_display_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_display_string(), "2.5");
    }

    #[test]
    fn mixed_int_float_equality_compares_by_value() {
        assert!(Value::Int(2).value_eq(&Value::Float(2.0)));
        assert!(!Value::Int(2).value_eq(&Value::Float(2.1)));
    }

    #[test]
    fn arrays_compare_structurally() {
        let a = Value::array(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::array(vec![Value::Int(1), Value::Int(2)]);
        assert!(a.value_eq(&b));
    }
}
