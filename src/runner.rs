// src/runner.rs

//! The process runner: spawn a child with all three pipes attached, feed its
//! stdin while draining stdout and stderr, and assemble the result once it
//! exits.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

use crate::cmdline::{self, Platform};
use crate::errors::{ExecError, Result};
use crate::events::{Event, EventKind, Registry};
use crate::result::RunResult;

/// Upper bound on a single pipe read; event chunks are never larger.
const CHUNK_SIZE: usize = 4096;

/// A command to run as a child process, with handlers subscribed to its
/// lifecycle events.
///
/// The program is executed directly, never through a shell, so arguments
/// reach the child exactly as given and a missing program fails the spawn
/// itself rather than surfacing as an interpreter's exit code.
#[derive(Debug)]
pub struct Runner {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    cwd: Option<PathBuf>,
    registry: Registry,
}

impl Runner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
            registry: Registry::default(),
        }
    }

    /// Append one argument, passed to the child as-is (never pre-quoted).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set one environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Set several environment variables for the child.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.envs.push((key.into(), value.into()));
        }
        self
    }

    /// Working directory for the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Subscribe `handler` to one of the four event names: `start`,
    /// `stdout`, `stderr` or `stop`. Handlers for the same name run in
    /// registration order; a handler error aborts the run that emitted the
    /// event, surfacing as [`ExecError::Handler`].
    ///
    /// Unknown names are accepted but never fire.
    pub fn on<F>(&mut self, event: &str, handler: F) -> &mut Self
    where
        F: FnMut(&Event) -> anyhow::Result<()> + Send + 'static,
    {
        match event.parse::<EventKind>() {
            Ok(kind) => self.registry.register(kind, Box::new(handler)),
            Err(reason) => {
                debug!(event, %reason, "handler subscribed to unknown event; it will never fire");
            }
        }
        self
    }

    /// The command line this runner reports for its spawns, rendered under
    /// the host platform's quoting policy.
    pub fn command_line(&self) -> String {
        cmdline::render(Platform::host(), &self.program, &self.args)
    }

    /// Run the command to completion, feeding `input` to the child's stdin
    /// (written verbatim; no trailing newline is added) and capturing both
    /// output streams while events fire.
    ///
    /// Waits as long as the child runs; there is no built-in timeout.
    /// Taking `&mut self` keeps a runner from executing twice concurrently,
    /// while sequential reuse stays possible.
    pub async fn run(&mut self, input: Option<&str>) -> Result<RunResult> {
        let command_line = self.command_line();

        let mut child = self
            .os_command()
            .spawn()
            .map_err(|source| ExecError::Spawn {
                command_line: command_line.clone(),
                source,
            })?;

        // Between spawn and wait the id is always present.
        let pid = child.id().unwrap_or(0);
        info!(cmd = %command_line, pid, "child process started");
        self.registry.emit(&Event::Start { pid })?;

        let (stdout, stderr) = self.drain(&mut child, input.map(str::as_bytes)).await?;

        let status = child.wait().await.map_err(|source| ExecError::Io {
            operation: "waiting for child exit",
            source,
        })?;
        let code = status.code().unwrap_or(-1);
        info!(pid, exit_code = code, success = status.success(), "child process exited");
        self.registry.emit(&Event::Stop { code })?;

        Ok(RunResult::new(command_line, code, stdout, stderr))
    }

    /// Readiness-multiplexed pump: write stdin while reading stdout and
    /// stderr in chunks of at most [`CHUNK_SIZE`] bytes, until both output
    /// pipes reach EOF and the input is fully written (or the child stops
    /// accepting it). Feeding and draining interleave, so a child that
    /// emits output before consuming all of its input cannot deadlock the
    /// run on a full pipe buffer, and a child that closes its outputs early
    /// still receives the rest of its input.
    async fn drain(&mut self, child: &mut Child, input: Option<&[u8]>) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut stdin_pipe = child.stdin.take();
        let mut out_pipe = child.stdout.take().ok_or_else(|| pipe_missing("stdout"))?;
        let mut err_pipe = child.stderr.take().ok_or_else(|| pipe_missing("stderr"))?;

        let mut pending = input.unwrap_or_default();
        if pending.is_empty() {
            // The child must see EOF on stdin right away, or programs like
            // `cat` would wait forever for input that never comes.
            drop(stdin_pipe.take());
        }

        let mut captured_out: Vec<u8> = Vec::new();
        let mut captured_err: Vec<u8> = Vec::new();
        let mut out_buf = [0u8; CHUNK_SIZE];
        let mut err_buf = [0u8; CHUNK_SIZE];
        let mut out_open = true;
        let mut err_open = true;

        // Invariant: stdin_pipe is Some exactly while bytes remain to write.
        // Output EOF alone must not end the loop while the feed is
        // unfinished; the write arm closes stdin on completion or broken
        // pipe.
        while out_open || err_open || stdin_pipe.is_some() {
            tokio::select! {
                read = out_pipe.read(&mut out_buf), if out_open => {
                    let n = read.map_err(|source| ExecError::Io {
                        operation: "reading child stdout",
                        source,
                    })?;
                    if n == 0 {
                        out_open = false;
                        debug!("child stdout closed");
                    } else {
                        debug!(bytes = n, "stdout chunk");
                        captured_out.extend_from_slice(&out_buf[..n]);
                        self.registry.emit(&Event::Stdout { chunk: out_buf[..n].to_vec() })?;
                    }
                }
                read = err_pipe.read(&mut err_buf), if err_open => {
                    let n = read.map_err(|source| ExecError::Io {
                        operation: "reading child stderr",
                        source,
                    })?;
                    if n == 0 {
                        err_open = false;
                        debug!("child stderr closed");
                    } else {
                        debug!(bytes = n, "stderr chunk");
                        captured_err.extend_from_slice(&err_buf[..n]);
                        self.registry.emit(&Event::Stderr { chunk: err_buf[..n].to_vec() })?;
                    }
                }
                written = feed_stdin(&mut stdin_pipe, pending), if stdin_pipe.is_some() => {
                    match written {
                        Ok(0) => {
                            // A zero-byte write with bytes still pending
                            // means the pipe is gone.
                            warn!("child stdin accepts no more input");
                            drop(stdin_pipe.take());
                        }
                        Ok(n) => {
                            pending = &pending[n..];
                            if pending.is_empty() {
                                debug!("input fully written, closing child stdin");
                                drop(stdin_pipe.take());
                            }
                        }
                        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                            // The child stopped reading before the input ran
                            // out (a `head`-like consumer). Not a run error.
                            warn!(unwritten = pending.len(), "child closed stdin early, dropping remaining input");
                            drop(stdin_pipe.take());
                        }
                        Err(source) => {
                            return Err(ExecError::Io {
                                operation: "writing child stdin",
                                source,
                            });
                        }
                    }
                }
            }
        }

        Ok((captured_out, captured_err))
    }

    fn os_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        self.apply_args(&mut cmd);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    // On posix targets the argv vector passes straight through. On Windows
    // each argument lands on the native command line verbatim (`raw_arg`),
    // with no interpreter and no escaping; see the `cmdline` module docs for
    // the limits of that policy.
    #[cfg(not(windows))]
    fn apply_args(&self, cmd: &mut Command) {
        cmd.args(&self.args);
    }

    #[cfg(windows)]
    fn apply_args(&self, cmd: &mut Command) {
        for arg in &self.args {
            cmd.raw_arg(arg);
        }
    }
}

/// Write some of `data` to stdin. The `select!` branch calling this is
/// guarded on `pipe.is_some()`, so the pending arm is never polled.
async fn feed_stdin(pipe: &mut Option<ChildStdin>, data: &[u8]) -> io::Result<usize> {
    match pipe {
        Some(stdin) => stdin.write(data).await,
        None => std::future::pending::<io::Result<usize>>().await,
    }
}

fn pipe_missing(name: &'static str) -> ExecError {
    ExecError::Io {
        operation: "taking child pipes",
        source: io::Error::other(format!("{name} pipe was not captured")),
    }
}
