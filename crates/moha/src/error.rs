//! Structured error types for compilation and execution failures.
//!
//! A split between compile-time diagnostics (`CompileError`) and a runtime
//! exception taxonomy (`ExcKind`/`RunError`) covering the handful of kinds
//! this language actually raises.

use std::fmt;

use strum::Display as StrumDisplay;

/// A `(line, column)` position in a source file, 1-indexed to match editor conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parse-time or compile-time failure.
///
/// Carries enough context (file name, location, message) to be surfaced
/// directly to a user without further lookups.
#[derive(Debug, Clone)]
pub struct CompileError {
    pub file: String,
    pub loc: CodeLoc,
    pub message: String,
}

impl CompileError {
    pub fn new(file: impl Into<String>, loc: CodeLoc, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            loc,
            message: message.into(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.loc, self.message)
    }
}

impl std::error::Error for CompileError {}

/// The kind of runtime exception raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum ExcKind {
    /// `LOAD_GLOBAL` found no binding and the name is not a builtin.
    NameError,
    /// An operator or call received operands of incompatible kinds.
    TypeError,
    /// Out-of-range array/string access, or a missing object key for `get`/`delete`.
    IndexError,
    /// `CALL_FUNC` with an argument count no dispatch arm of an instance method accepts.
    ArityError,
    /// Explicit `abort` statement, or an `EXIT` with no matching guard at the top level.
    Abort,
    /// File not found, read failure, or a downstream error while importing a module.
    ModuleError,
    /// Division or modulo by zero.
    ZeroDivisionError,
    /// Call depth exceeded the configured recursion limit.
    RecursionError,
}

/// A runtime error produced while executing bytecode.
///
/// Unwinds the frame stack to the outermost caller; there is no
/// user-level exception mechanism to catch it mid-execution.
#[derive(Debug, Clone)]
pub struct RunError {
    pub kind: ExcKind,
    pub message: String,
}

impl RunError {
    pub fn new(kind: ExcKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn name_error(name: &str) -> Self {
        Self::new(ExcKind::NameError, format!("unresolved variable: {name}"))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExcKind::TypeError, message)
    }

    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ExcKind::IndexError, message)
    }

    pub fn arity_error(message: impl Into<String>) -> Self {
        Self::new(ExcKind::ArityError, message)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RunError {}

/// Top-level error returned by the public `Runner`/`Interpreter` API.
#[derive(Debug, Clone)]
pub enum MohaError {
    Compile(CompileError),
    Run(RunError),
}

impl fmt::Display for MohaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile(e) => write!(f, "{e}"),
            Self::Run(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MohaError {}

impl From<CompileError> for MohaError {
    fn from(e: CompileError) -> Self {
        Self::Compile(e)
    }
}

impl From<RunError> for MohaError {
    fn from(e: RunError) -> Self {
        Self::Run(e)
    }
}
