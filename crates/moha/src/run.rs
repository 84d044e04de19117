//! Public embedding interface for running `moha` code.
//!
//! A thin façade gluing the module loader, resource limits, and the
//! `PrintWriter`/`VmTracer` pair together so an embedder (or the CLI
//! driver) doesn't have to construct a [`crate::module::ModuleLoader`] by
//! hand.

use std::path::Path;

use crate::error::MohaError;
use crate::io::{PrintWriter, StdPrint};
use crate::module::ModuleLoader;
use crate::resource::{RecursionGuard, ResourceLimits};
use crate::sys::Sys;
use crate::tracer::{NoopTracer, VmTracer};

/// Runs `path` as the entry module, writing `print` output through `print`
/// and reporting execution to `tracer`.
///
/// # Errors
/// Returns [`MohaError::Compile`] for a parse failure in `path` or any file
/// it imports, and [`MohaError::Run`] for any execution-time failure.
pub fn run_file<P: PrintWriter, T: VmTracer>(path: &Path, limits: ResourceLimits, print: &mut P, tracer: &mut T) -> Result<(), MohaError> {
    let executable = path.display().to_string();
    let sys = Sys::from_current_dir(executable).map_err(|e| {
        MohaError::from(crate::error::RunError::new(
            crate::error::ExcKind::ModuleError,
            format!("cannot determine current directory: {e}"),
        ))
    })?;

    let mut loader = ModuleLoader::new(sys);
    let mut recursion = RecursionGuard::default();
    loader.load_entry_file(path, limits, &mut recursion, print, tracer)?;
    Ok(())
}

/// Runs `path` with the default recursion limit, a no-op tracer, and stdout
/// as the print sink — the shape the CLI driver uses.
///
/// # Errors
/// See [`run_file`].
pub fn run_file_default(path: &Path) -> Result<(), MohaError> {
    run_file(path, ResourceLimits::default(), &mut StdPrint, &mut NoopTracer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::CollectStringPrint;
    use crate::tracer::NoopTracer;
    use std::io::Write;

    #[test]
    fn runs_a_file_and_captures_print_output() {
        let dir = std::env::temp_dir().join(format!("moha-run-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("hello.mo");
        std::fs::File::create(&file).unwrap().write_all(b"print(\"hello\");").unwrap();

        let mut print = CollectStringPrint::new();
        let mut tracer = NoopTracer;
        run_file(&file, ResourceLimits::default(), &mut print, &mut tracer).unwrap();
        assert_eq!(print.into_string(), "hello\n");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
