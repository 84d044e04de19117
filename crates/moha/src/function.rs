//! Function values: compiled bodies, builtins, and host instance methods.
//!
//! `MAP_GETITEM` must not mutate a shared `Function` to remember its
//! receiver, since the same function value (e.g. the constant-pool entry
//! for a `def`) can be loaded and bound through many different receivers.
//! [`FunctionValue::bind`] instead clones into a fresh value with the
//! receiver set.

use std::rc::Rc;

use crate::bytecode::Code;
use crate::value::Value;

/// A builtin dispatched by name from `LOAD_GLOBAL` when no frame on the call
/// stack has a matching local.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    Print,
    Str,
    Id,
}

impl BuiltinKind {
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "print" => Some(Self::Print),
            "str" => Some(Self::Str),
            "id" => Some(Self::Id),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Str => "str",
            Self::Id => "id",
        }
    }
}

/// A host-side operation over Array/String receivers, dispatched with arity
/// 0–3. The receiver is always `args[0]` once a bound call prepends it
/// during `CALL_FUNC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceMethodKind {
    ArrayPush,
    ArrayPop,
    ArrayIndex,
    ArrayLength,
    StringIndex,
    StringLength,
}

impl InstanceMethodKind {
    /// Looks up the method named `name` available on a receiver of the given
    /// runtime type name (`"array"` or `"string"`), as produced by
    /// `MAP_GETITEM` when the base value is an Array or String.
    #[must_use]
    pub fn lookup(receiver_type: &str, name: &str) -> Option<Self> {
        match (receiver_type, name) {
            ("array", "push") => Some(Self::ArrayPush),
            ("array", "pop") => Some(Self::ArrayPop),
            ("array", "index") => Some(Self::ArrayIndex),
            ("array", "length") => Some(Self::ArrayLength),
            ("string", "index") => Some(Self::StringIndex),
            ("string", "length") => Some(Self::StringLength),
            _ => None,
        }
    }

    /// The arities this method accepts, *including* the bound receiver as
    /// argument 0. `CALL_FUNC` raises an `ArityError` when the actual count
    /// (receiver + explicit args) matches none of these.
    #[must_use]
    pub fn accepted_arities(self) -> &'static [usize] {
        match self {
            Self::ArrayPush => &[2],
            Self::ArrayPop | Self::ArrayLength | Self::StringLength => &[1],
            Self::ArrayIndex | Self::StringIndex => &[2],
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ArrayPush => "push",
            Self::ArrayPop => "pop",
            Self::ArrayIndex | Self::StringIndex => "index",
            Self::ArrayLength | Self::StringLength => "length",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FunctionKind {
    /// A `def`-compiled or closure-compiled function body.
    Compiled(Rc<Code>),
    Builtin(BuiltinKind),
    InstanceMethod(InstanceMethodKind),
}

/// A callable value. `receiver` is `None` until `MAP_GETITEM` binds it as
/// a bound method; binding never mutates an existing `FunctionValue`, it
/// produces a new one via [`bind`](Self::bind).
#[derive(Debug, Clone)]
pub struct FunctionValue {
    name: String,
    kind: FunctionKind,
    receiver: Option<Value>,
}

impl FunctionValue {
    #[must_use]
    pub fn compiled(name: impl Into<String>, code: Rc<Code>) -> Self {
        Self {
            name: name.into(),
            kind: FunctionKind::Compiled(code),
            receiver: None,
        }
    }

    #[must_use]
    pub fn builtin(kind: BuiltinKind) -> Self {
        Self {
            name: kind.name().to_owned(),
            kind: FunctionKind::Builtin(kind),
            receiver: None,
        }
    }

    #[must_use]
    pub fn instance_method(kind: InstanceMethodKind) -> Self {
        Self {
            name: kind.name().to_owned(),
            kind: FunctionKind::InstanceMethod(kind),
            receiver: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    #[must_use]
    pub fn receiver(&self) -> Option<&Value> {
        self.receiver.as_ref()
    }

    /// Returns a clone of `self` with `receiver` bound, leaving `self`
    /// untouched — the shared `Function` in the constant pool is never
    /// mutated in place.
    #[must_use]
    pub fn bind(&self, receiver: Value) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            receiver: Some(receiver),
        }
    }
}
