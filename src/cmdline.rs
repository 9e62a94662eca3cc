// src/cmdline.rs

//! Rendering a program and its arguments as one command-line string.
//!
//! The rendered line is what identifies a run: it is logged at spawn time,
//! reported by [`ExecError::Spawn`](crate::ExecError::Spawn), and exposed on
//! the final [`RunResult`](crate::RunResult). The two platform policies are
//! intentionally asymmetric:
//!
//! - **Posix**: the program and every argument are quoted as single shell
//!   tokens, so the rendered line survives a `sh -c` round trip with each
//!   argument byte-identical.
//! - **Windows**: the program is double-quoted with backslashes doubled, and
//!   arguments are joined by single spaces with **no escaping at all**.
//!   Argument values are caller-trusted on this path; an argument containing
//!   spaces or quotes will be re-split by the target program's own
//!   command-line parser. This is a known, deliberate limitation.

/// Which rendering policy to apply. Kept injectable so both policies stay
/// testable on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Posix,
    Windows,
}

impl Platform {
    /// The policy matching the compile target.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }
}

/// Render `program` plus `args` as a single command-line string under the
/// given platform policy.
pub fn render(platform: Platform, program: &str, args: &[String]) -> String {
    match platform {
        Platform::Posix => render_posix(program, args),
        Platform::Windows => render_windows(program, args),
    }
}

fn render_posix(program: &str, args: &[String]) -> String {
    let mut line = quote_program(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

// `"program" arg1 arg2` with backslashes in the program doubled and the
// arguments appended verbatim.
fn render_windows(program: &str, args: &[String]) -> String {
    let mut line = format!("\"{}\"", program.replace('\\', "\\\\"));
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Quote one argument as a single shell token. Empty arguments stay
/// addressable as `''`; embedded single quotes use the `'"'"'` idiom.
fn quote_arg(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}

// The program token may stay bare when no character in it can be misparsed.
fn quote_program(s: &str) -> String {
    if !s.is_empty() && is_simple_word(s) {
        s.to_string()
    } else {
        quote_arg(s)
    }
}

fn is_simple_word(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(c,
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | ':' | '+' | '%' | '@' | '=' | ',')
    })
}
