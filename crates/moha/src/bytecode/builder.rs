//! Incremental instruction-vector builder with back-patchable jump labels.
//!
//! Emit opcodes as you walk the AST, reserve a placeholder slot for a
//! forward (or backward) jump target, and patch it once the real
//! destination is known. Instructions are stored one-per-slot in a
//! `Vec<(Opcode, i64)>` — `pc` is an instruction index rather than a byte
//! offset, so a jump target is simply "the index the next `emit` call will
//! occupy", and every jump lands exactly on an instruction boundary by
//! construction.

use crate::bytecode::code::{Code, Instruction};
use crate::bytecode::op::Opcode;
use crate::symbol_table::SymbolTable;
use crate::value::Value;

/// Opaque placeholder for a jump instruction whose target is not yet known.
#[derive(Debug, Clone, Copy)]
pub struct JumpLabel(usize);

pub struct CodeBuilder {
    instructions: Vec<Instruction>,
    constants: Vec<Value>,
    vars: SymbolTable,
    names: SymbolTable,
    name: String,
}

impl CodeBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            instructions: Vec::new(),
            constants: Vec::new(),
            vars: SymbolTable::new(),
            names: SymbolTable::new(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn vars(&self) -> &SymbolTable {
        &self.vars
    }

    #[must_use]
    pub fn vars_mut(&mut self) -> &mut SymbolTable {
        &mut self.vars
    }

    #[must_use]
    pub fn names_mut(&mut self) -> &mut SymbolTable {
        &mut self.names
    }

    /// Appends `value` to the constant pool and returns its index. Per spec
    /// §3 invariant 4, the pool is append-only: equal literals may occupy
    /// distinct slots, so this never deduplicates.
    pub fn add_constant(&mut self, value: Value) -> i64 {
        let idx = self.constants.len();
        self.constants.push(value);
        i64::try_from(idx).expect("constant pool exceeds i64 capacity")
    }

    /// Current instruction index — the position the *next* `emit` call will occupy.
    #[must_use]
    pub fn here(&self) -> usize {
        self.instructions.len()
    }

    pub fn emit(&mut self, opcode: Opcode, arg: i64) -> usize {
        let idx = self.here();
        self.instructions.push((opcode, arg));
        idx
    }

    /// Emits a jump instruction with a placeholder target, to be filled in
    /// later via [`patch_jump`](Self::patch_jump).
    pub fn emit_jump(&mut self, opcode: Opcode) -> JumpLabel {
        JumpLabel(self.emit(opcode, -1))
    }

    /// Patches a previously-emitted jump to target the current position.
    pub fn patch_jump(&mut self, label: JumpLabel) {
        self.patch_jump_to(label, self.here());
    }

    /// Patches a previously-emitted jump to target an explicit instruction index.
    pub fn patch_jump_to(&mut self, label: JumpLabel, target: usize) {
        let target = i64::try_from(target).expect("instruction index exceeds i64 capacity");
        self.instructions[label.0].1 = target;
    }

    #[must_use]
    pub fn finish(self) -> Code {
        Code::new(self.instructions, self.constants, self.vars, self.names, self.name)
    }
}
