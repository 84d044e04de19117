//! VM execution tracing infrastructure.
//!
//! A hook-point trait with a zero-cost no-op implementation for production
//! and a `stderr`-logging implementation for debugging, monomorphized into
//! the VM rather than dispatched through a `dyn` object or a logging crate.

use crate::bytecode::Opcode;

/// Hook points the VM calls into during execution.
///
/// [`NoopTracer`] implements every method as an empty body, which the
/// optimizer removes entirely via monomorphization — there is no overhead
/// in the production path.
pub trait VmTracer {
    /// Called before dispatching each instruction.
    fn on_instruction(&mut self, _ip: usize, _opcode: Opcode, _stack_depth: usize) {}

    /// Called when a compiled function call pushes a new frame.
    fn on_call(&mut self, _depth: usize, _arg_count: usize) {}

    /// Called when a frame returns.
    fn on_return(&mut self, _depth: usize) {}
}

/// Zero-cost tracer used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Tracer that logs every instruction and call/return to stderr.
///
/// Intended for debugging a misbehaving `moha` program, not for production
/// use — it allocates a formatted line per instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl VmTracer for StderrTracer {
    fn on_instruction(&mut self, ip: usize, opcode: Opcode, stack_depth: usize) {
        eprintln!("{ip:>5} {opcode:?} (stack={stack_depth})");
    }

    fn on_call(&mut self, depth: usize, arg_count: usize) {
        eprintln!("  call -> depth={depth} argc={arg_count}");
    }

    fn on_return(&mut self, depth: usize) {
        eprintln!("  return -> depth={depth}");
    }
}
