//! The module loader.
//!
//! Reads a file, compiles it, runs it to completion, then wraps its
//! now-populated top-level frame as a `Module` value. Adds caching and
//! cycle detection on top: a `HashMap<PathBuf, ModuleState>` keyed by
//! canonicalized path, so re-importing the same file within one run reuses
//! the already-populated module, and an in-progress marker that turns a
//! circular import into a `ModuleError` instead of infinite recursion.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bytecode::compile_program;
use crate::error::{ExcKind, RunError};
use crate::io::PrintWriter;
use crate::parser::parse_program;
use crate::resource::{RecursionGuard, ResourceLimits};
use crate::sys::Sys;
use crate::tracer::VmTracer;
use crate::value::ModuleValue;

enum ModuleState {
    InProgress,
    Loaded(Rc<ModuleValue>),
}

/// Owns the process-wide `Sys` context and the cache/cycle-detection state
/// for every module loaded so far in this run.
pub struct ModuleLoader {
    sys: Sys,
    cache: HashMap<PathBuf, ModuleState>,
    /// Directory of the file currently being loaded, one entry per nested
    /// import in progress — `./`-relative specs resolve against its top.
    loading_stack: Vec<PathBuf>,
}

impl ModuleLoader {
    #[must_use]
    pub fn new(sys: Sys) -> Self {
        Self {
            sys,
            cache: HashMap::new(),
            loading_stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn sys(&self) -> &Sys {
        &self.sys
    }

    /// `./`-relative specs resolve against the currently-importing file's
    /// directory; anything else resolves against `<env_path>/libs/`. The
    /// `.mo` extension is appended via raw path-string concatenation, not
    /// [`Path::with_extension`], so a spec containing a dot (e.g.
    /// `./v1.2/util`) isn't corrupted.
    fn resolve_path(&self, spec: &str) -> PathBuf {
        let base = if let Some(rel) = spec.strip_prefix("./") {
            let dir = self.loading_stack.last().map_or_else(|| self.sys.cwd().to_path_buf(), Path::to_path_buf);
            dir.join(rel)
        } else {
            self.sys.libs_path().join(spec)
        };
        let mut with_ext = base.into_os_string();
        with_ext.push(".mo");
        PathBuf::from(with_ext)
    }

    /// Loads and runs `spec` to completion, returning its namespace as a
    /// `Module` value. Recurses into [`crate::vm::run`] to execute the
    /// loaded file — the one place this codebase uses genuine Rust-level
    /// recursion rather than the VM's own frame stack, since a nested import
    /// is a distinct top-level program, not a function call.
    pub fn load<P: PrintWriter, T: VmTracer>(
        &mut self,
        spec: &str,
        limits: ResourceLimits,
        recursion: &mut RecursionGuard,
        print: &mut P,
        tracer: &mut T,
    ) -> Result<Rc<ModuleValue>, RunError> {
        let path = self.resolve_path(spec);
        let canonical = path
            .canonicalize()
            .map_err(|e| RunError::new(ExcKind::ModuleError, format!("cannot read module '{spec}': {e}")))?;
        self.load_canonical(canonical, spec, limits, recursion, print, tracer)
    }

    /// Loads the entry file named directly on the command line, bypassing
    /// the `./`/`libs/` spec resolution `load` applies to `import`
    /// statements — an argv path is already a filesystem path, not an
    /// import spec.
    pub fn load_entry_file<P: PrintWriter, T: VmTracer>(
        &mut self,
        path: &Path,
        limits: ResourceLimits,
        recursion: &mut RecursionGuard,
        print: &mut P,
        tracer: &mut T,
    ) -> Result<Rc<ModuleValue>, RunError> {
        let spec = path.display().to_string();
        let canonical = path
            .canonicalize()
            .map_err(|e| RunError::new(ExcKind::ModuleError, format!("cannot read '{spec}': {e}")))?;
        self.load_canonical(canonical, &spec, limits, recursion, print, tracer)
    }

    fn load_canonical<P: PrintWriter, T: VmTracer>(
        &mut self,
        canonical: PathBuf,
        spec: &str,
        limits: ResourceLimits,
        recursion: &mut RecursionGuard,
        print: &mut P,
        tracer: &mut T,
    ) -> Result<Rc<ModuleValue>, RunError> {
        match self.cache.get(&canonical) {
            Some(ModuleState::Loaded(module)) => return Ok(Rc::clone(module)),
            Some(ModuleState::InProgress) => {
                return Err(RunError::new(ExcKind::ModuleError, format!("circular import: {spec}")));
            }
            None => {}
        }
        self.cache.insert(canonical.clone(), ModuleState::InProgress);

        let source = std::fs::read_to_string(&canonical)
            .map_err(|e| RunError::new(ExcKind::ModuleError, format!("cannot read module '{spec}': {e}")))?;
        let file_label = canonical.display().to_string();
        let stmts = parse_program(&file_label, &source).map_err(|e| RunError::new(ExcKind::ModuleError, e.to_string()))?;

        let module_name = canonical
            .file_stem()
            .and_then(std::ffi::OsStr::to_str)
            .map_or_else(|| spec.to_owned(), str::to_owned);
        let code = Rc::new(compile_program(&module_name, &stmts));

        let importer_dir = canonical.parent().map_or_else(|| self.sys.cwd().to_path_buf(), Path::to_path_buf);
        self.loading_stack.push(importer_dir);
        let frame = crate::vm::run(Rc::clone(&code), self, print, tracer, limits, recursion);
        self.loading_stack.pop();
        let frame = frame?;

        let mut entries = IndexMap::new();
        for name in code.vars().keys() {
            let idx = code.vars().get(name).expect("name was just read from this table");
            entries.insert(name.to_owned(), frame.local(idx));
        }

        let module = Rc::new(ModuleValue {
            name: module_name,
            path: canonical.clone(),
            namespace: Rc::new(RefCell::new(entries)),
        });
        self.cache.insert(canonical, ModuleState::Loaded(Rc::clone(&module)));
        Ok(module)
    }
}
