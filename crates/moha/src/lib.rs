//! `moha`: a small dynamically-typed language with a bytecode compiler and a
//! stack-based virtual machine.
//!
//! The pipeline is source text → [`lexer`] → [`parser`] → [`ast`] →
//! [`bytecode`] compiler → [`vm`] interpreter, with [`module`] recursively
//! loading and running imported files. [`run::run_file`] is the easiest
//! entry point for embedding; the `moha-cli` crate is a thin wrapper over it.

mod ast;
mod builtins;
mod bytecode;
mod error;
mod function;
mod io;
mod lexer;
mod module;
mod namespace;
mod parser;
mod resource;
mod run;
mod symbol_table;
mod sys;
mod tracer;
mod value;
mod vm;

pub use crate::bytecode::Opcode;
pub use crate::error::{CodeLoc, CompileError, ExcKind, MohaError, RunError};
pub use crate::function::{BuiltinKind, FunctionKind, FunctionValue, InstanceMethodKind};
pub use crate::io::{CollectStringPrint, PrintWriter, StdPrint};
pub use crate::module::ModuleLoader;
pub use crate::parser::parse_program;
pub use crate::resource::{DEFAULT_MAX_RECURSION_DEPTH, RecursionGuard, ResourceLimits};
pub use crate::run::{run_file, run_file_default};
pub use crate::sys::Sys;
pub use crate::tracer::{NoopTracer, StderrTracer, VmTracer};
pub use crate::value::{ArrayRef, ModuleValue, ObjectRef, Value};
