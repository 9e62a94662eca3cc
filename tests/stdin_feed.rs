// tests/stdin_feed.rs

//! Input feeding: verbatim writes, interleaving under pipe-buffer pressure,
//! and children that stop reading early.

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::sync::{Arc, Mutex};

use livecmd::{Event, Runner};

#[tokio::test]
async fn input_reaches_the_child_verbatim() {
    init_tracing();

    let echoed: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let mut cmd = Runner::new("cat");
    {
        let echoed = Arc::clone(&echoed);
        cmd.on("stdout", move |event| {
            if let Event::Stdout { chunk } = event {
                echoed.lock().unwrap().extend_from_slice(chunk);
            }
            Ok(())
        });
    }

    let result = with_timeout(cmd.run(Some("hello"))).await.unwrap();

    // No implicit trailing newline, and the live chunks concatenate to the
    // same bytes the capture holds.
    assert_eq!(result.stdout_lossy(), "hello");
    assert_eq!(*echoed.lock().unwrap(), result.stdout());
}

#[tokio::test]
async fn child_transforms_piped_input() {
    init_tracing();

    let mut cmd = Runner::new("tr").args(["a-z", "A-Z"]);
    let result = with_timeout(cmd.run(Some("hello\nworld\n"))).await.unwrap();

    assert_eq!(result.stdout_lossy(), "HELLO\nWORLD\n");
}

#[tokio::test]
async fn no_input_closes_stdin_immediately() {
    init_tracing();

    // Without an immediate EOF on stdin, cat would wait forever.
    let mut cmd = Runner::new("cat");
    let result = with_timeout(cmd.run(None)).await.unwrap();

    assert!(result.success());
    assert!(result.stdout().is_empty());
}

#[tokio::test]
async fn empty_input_behaves_like_no_input() {
    init_tracing();

    let mut cmd = Runner::new("cat");
    let result = with_timeout(cmd.run(Some(""))).await.unwrap();

    assert!(result.success());
    assert!(result.stdout().is_empty());
}

#[tokio::test]
async fn large_input_interleaves_with_draining() {
    init_tracing();

    // Input far beyond pipe capacity while the child echoes everything back;
    // this only completes if feeding and draining interleave.
    let input = "x".repeat(1 << 20);
    let mut cmd = Runner::new("cat");
    let result = with_timeout(cmd.run(Some(&input))).await.unwrap();

    assert!(result.success());
    assert_eq!(result.stdout().len(), input.len());
}

#[tokio::test]
async fn input_still_delivered_when_child_closes_outputs_first() {
    init_tracing();

    // A child that routes its output away closes both parent-side pipes
    // long before it touches stdin; the feed must still run to completion
    // rather than cutting the child off at output EOF.
    let dir = tempfile::tempdir().unwrap();
    let count_file = dir.path().join("count");
    let input = "z".repeat(1 << 20);
    let script = format!(
        "exec >/dev/null 2>&1; sleep 1; wc -c >{}",
        count_file.display()
    );
    let mut cmd = Runner::new("sh").args(["-c", script.as_str()]);
    let result = with_timeout(cmd.run(Some(&input))).await.unwrap();

    assert!(result.success());
    assert!(result.stdout().is_empty());
    let counted: usize = std::fs::read_to_string(&count_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert_eq!(counted, input.len());
}

#[tokio::test]
async fn early_stdin_close_is_not_an_error() {
    init_tracing();

    // head stops reading after the first line; the unwritten remainder must
    // not fail the run.
    let input = format!("first\n{}", "y".repeat(1 << 20));
    let mut cmd = Runner::new("head").args(["-n", "1"]);
    let result = with_timeout(cmd.run(Some(&input))).await.unwrap();

    assert!(result.success());
    assert_eq!(result.stdout_lossy(), "first\n");
}
