// src/result.rs

//! The immutable record of a completed run.

use std::borrow::Cow;

/// Snapshot of one finished child process: what was run, how it exited, and
/// everything it wrote on the way. Built by [`Runner::run`] only after the
/// child has exited, so the captures are always complete.
///
/// [`Runner::run`]: crate::Runner::run
#[derive(Debug, Clone)]
pub struct RunResult {
    command_line: String,
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl RunResult {
    pub(crate) fn new(
        command_line: String,
        exit_code: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    ) -> Self {
        Self {
            command_line,
            exit_code,
            stdout,
            stderr,
        }
    }

    /// The rendered command line that produced this result.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Platform exit code; `-1` when the child was terminated by a signal
    /// instead of exiting.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Everything the child wrote to stdout, as raw bytes.
    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    /// Everything the child wrote to stderr, as raw bytes.
    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Captured stdout as text, invalid UTF-8 replaced.
    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Captured stderr as text, invalid UTF-8 replaced.
    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}
