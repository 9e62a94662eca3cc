// src/lib.rs

//! Run an external command with all three standard pipes attached, watch its
//! output live, and collect the fully captured result.
//!
//! [`Runner`] spawns the child directly (no shell), feeds optional input to
//! its stdin while draining stdout and stderr concurrently, and emits
//! `start` / `stdout` / `stderr` / `stop` events as they happen. Once the
//! child exits, [`RunResult`] carries the exit code and both captured
//! streams.
//!
//! ```no_run
//! use livecmd::{Event, Runner};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut cmd = Runner::new("tr").arg("a-z").arg("A-Z");
//! cmd.on("stdout", |event| {
//!     if let Event::Stdout { chunk } = event {
//!         print!("{}", String::from_utf8_lossy(chunk));
//!     }
//!     Ok(())
//! });
//!
//! let result = cmd.run(Some("hello")).await?;
//! assert!(result.success());
//! assert_eq!(result.stdout_lossy(), "HELLO");
//! # Ok(())
//! # }
//! ```

pub mod cmdline;
pub mod errors;
pub mod events;
pub mod result;
pub mod runner;

pub use cmdline::Platform;
pub use errors::{ExecError, Result};
pub use events::{Event, EventKind};
pub use result::RunResult;
pub use runner::Runner;
