//! Output sink abstraction for the `print` builtin.
//!
//! Decoupling `print` from stdout lets tests capture output instead of
//! racing real IO, and lets an embedder redirect it.

/// Receives the formatted text produced by the `print` builtin.
pub trait PrintWriter {
    /// Writes one line of output, including the trailing newline.
    ///
    /// `print(v)` calls this exactly once per invocation with `v.str()`
    /// followed by `\n`.
    fn write_line(&mut self, line: &str);
}

/// Default `PrintWriter` that writes to stdout.
#[derive(Debug, Default)]
pub struct StdPrint;

impl PrintWriter for StdPrint {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

/// `PrintWriter` that collects output in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectStringPrint {
    buffer: String,
}

impl CollectStringPrint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl PrintWriter for CollectStringPrint {
    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }
}
