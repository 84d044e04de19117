//! Process-wide execution context (cwd, executable path, env/libs path).
//!
//! A small process-wide record mutated only at startup, carried through
//! the loader so module resolution can find `libs/`.

use std::path::{Path, PathBuf};

/// Process-wide context: current directory, executable name, and the
/// environment path module resolution searches under.
///
/// Mutated only at startup; the loader and every module it loads share
/// one immutable `Sys`.
#[derive(Debug, Clone)]
pub struct Sys {
    cwd: PathBuf,
    executable: String,
    env_path: PathBuf,
}

impl Sys {
    #[must_use]
    pub fn new(executable: impl Into<String>, cwd: PathBuf, env_path: PathBuf) -> Self {
        Self {
            cwd,
            executable: executable.into(),
            env_path,
        }
    }

    /// Builds a `Sys` using the process's current working directory for both
    /// `cwd` and `env_path`.
    #[must_use]
    pub fn from_current_dir(executable: impl Into<String>) -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(executable, cwd.clone(), cwd))
    }

    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    #[must_use]
    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    /// `<env_path>/libs`, where non-relative module imports are resolved.
    #[must_use]
    pub fn libs_path(&self) -> PathBuf {
        self.env_path.join("libs")
    }
}
