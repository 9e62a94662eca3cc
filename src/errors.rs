// src/errors.rs

//! Crate-wide error taxonomy.

use thiserror::Error;

use crate::events::EventKind;

#[derive(Error, Debug)]
pub enum ExecError {
    /// The child process could not be created. No events have fired and no
    /// output was captured.
    #[error("Cannot spawn `{command_line}`: {source}")]
    Spawn {
        command_line: String,
        source: std::io::Error,
    },

    /// A pipe or wait operation failed while the child was running.
    #[error("IO error while {operation}: {source}")]
    Io {
        operation: &'static str,
        source: std::io::Error,
    },

    /// A subscribed handler returned an error; the run it observed was
    /// aborted.
    #[error("Handler for `{event}` failed: {source}")]
    Handler {
        event: EventKind,
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, ExecError>;
