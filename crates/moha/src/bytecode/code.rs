//! Compiled bytecode: the static, read-only output of the compiler.
//!
//! Four tables: instructions, constants, `vars` (locals), `names`
//! (referenced globals).

use crate::bytecode::op::Opcode;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// A single `(opcode, arg)` instruction. `arg` is `0` when unused.
pub type Instruction = (Opcode, i64);

/// The compiled form of a program or a single function body. Shared
/// behind `Rc` by every frame executing it, including recursive
/// invocations of the same function — it is read-only after compilation
/// and never cloned per-call.
#[derive(Debug)]
pub struct Code {
    instructions: Vec<Instruction>,
    constants: Vec<Value>,
    vars: SymbolTable,
    names: SymbolTable,
    name: String,
}

impl Code {
    #[must_use]
    pub fn new(instructions: Vec<Instruction>, constants: Vec<Value>, vars: SymbolTable, names: SymbolTable, name: impl Into<String>) -> Self {
        Self {
            instructions,
            constants,
            vars,
            names,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub fn constant(&self, index: i64) -> &Value {
        &self.constants[index as usize]
    }

    #[must_use]
    pub fn vars(&self) -> &SymbolTable {
        &self.vars
    }

    #[must_use]
    pub fn names(&self) -> &SymbolTable {
        &self.names
    }

    /// Size of `vars` at compile time; the runtime allocates this many local
    /// slots per frame.
    #[must_use]
    pub fn numvars(&self) -> usize {
        self.vars.size()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of instruction slots, for jump-target bound checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
