//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT block a thread with `std::thread::sleep`.
//! **Policy**: `tokio::time::sleep` is allowed only where waiting is the
//! feature: the UI frame tick and the mock assistant's configurable delay.
//! Test code is exempt.

use architectural_enforcement::{production_lines, report};

/// Files allowed to call `tokio::time::sleep`
const ASYNC_SLEEP_ALLOWED: &[&str] = &["app.rs", "mock.rs"];

#[test]
fn test_no_thread_sleep_in_production_code() {
    let violations: Vec<String> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| production_lines(dir))
        .filter(|line| line.code().contains("thread::sleep"))
        .map(|line| line.describe("Thread sleep"))
        .collect();

    report(
        "CRITICAL: Thread sleeps found in production code!",
        &[
            "❌ FORBIDDEN: std::thread::sleep (blocks a runtime worker)",
            "✅ Wait on I/O, channels or tokio::time::interval instead",
        ],
        &violations,
    );
}

#[test]
fn test_async_sleep_only_where_allowed() {
    let violations: Vec<String> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| production_lines(dir))
        .filter(|line| line.code().contains("time::sleep"))
        .filter(|line| {
            let file = line
                .path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or_default();
            !ASYNC_SLEEP_ALLOWED.contains(&file)
        })
        .map(|line| line.describe("Sleep outside frame tick / mock delay"))
        .collect();

    report(
        "CRITICAL: Sleep used as synchronization!",
        &[
            "✅ ACCEPTABLE: UI frame tick, mock assistant delay, test code",
            "❌ FORBIDDEN: sleeping to wait for another task",
        ],
        &violations,
    );
}
