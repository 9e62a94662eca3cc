// src/events.rs

//! Lifecycle events and the handler registry behind [`Runner::on`].
//!
//! A run emits four event names: `start` once the child exists, `stdout`
//! and `stderr` for every chunk drained off the corresponding pipe, and
//! `stop` once the child has exited. Chunk payloads are raw bytes cut at
//! read boundaries, never aligned to lines or UTF-8 sequences.
//!
//! [`Runner::on`]: crate::Runner::on

use std::fmt;
use std::str::FromStr;

use crate::errors::{ExecError, Result};

/// The fixed set of event names a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Stdout,
    Stderr,
    Stop,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Stdout => "stdout",
            EventKind::Stderr => "stderr",
            EventKind::Stop => "stop",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(EventKind::Start),
            "stdout" => Ok(EventKind::Stdout),
            "stderr" => Ok(EventKind::Stderr),
            "stop" => Ok(EventKind::Stop),
            other => Err(format!("unknown event name: {other}")),
        }
    }
}

/// One lifecycle notification, delivered synchronously to every handler
/// registered for its kind, in registration order.
#[derive(Debug, Clone)]
pub enum Event {
    /// The child process exists. Carries its process id.
    Start { pid: u32 },
    /// A chunk was read from the child's stdout.
    Stdout { chunk: Vec<u8> },
    /// A chunk was read from the child's stderr.
    Stderr { chunk: Vec<u8> },
    /// The child exited. Carries the exit code the result will report.
    Stop { code: i32 },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start { .. } => EventKind::Start,
            Event::Stdout { .. } => EventKind::Stdout,
            Event::Stderr { .. } => EventKind::Stderr,
            Event::Stop { .. } => EventKind::Stop,
        }
    }
}

pub(crate) type Handler = Box<dyn FnMut(&Event) -> anyhow::Result<()> + Send>;

/// Ordered handler lists, one per event kind.
#[derive(Default)]
pub(crate) struct Registry {
    start: Vec<Handler>,
    stdout: Vec<Handler>,
    stderr: Vec<Handler>,
    stop: Vec<Handler>,
}

impl Registry {
    pub(crate) fn register(&mut self, kind: EventKind, handler: Handler) {
        self.slot(kind).push(handler);
    }

    /// Invoke every handler registered for the event's kind. The first
    /// handler error stops delivery and is surfaced to the caller.
    pub(crate) fn emit(&mut self, event: &Event) -> Result<()> {
        let kind = event.kind();
        for handler in self.slot(kind) {
            handler(event).map_err(|source| ExecError::Handler { event: kind, source })?;
        }
        Ok(())
    }

    fn slot(&mut self, kind: EventKind) -> &mut Vec<Handler> {
        match kind {
            EventKind::Start => &mut self.start,
            EventKind::Stdout => &mut self.stdout,
            EventKind::Stderr => &mut self.stderr,
            EventKind::Stop => &mut self.stop,
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("start", &self.start.len())
            .field("stdout", &self.stdout.len())
            .field("stderr", &self.stderr.len())
            .field("stop", &self.stop.len())
            .finish()
    }
}
