//! Integration Test: Panic Prohibition
//!
//! **Policy**: No failure in a conversation may take the process down. Production
//! code propagates errors with `?` or routes them to the error display, it
//! never calls `.unwrap()` or `.expect(...)`. Test code is exempt.

use architectural_enforcement::{production_lines, report};

#[test]
fn test_no_unwrap_or_expect_in_production_code() {
    let violations: Vec<String> = ["core/src", "tui/src"]
        .iter()
        .flat_map(|dir| production_lines(dir))
        .filter(|line| {
            let code = line.code();
            code.contains(".unwrap()") || code.contains(".expect(")
        })
        .map(|line| line.describe("Panicking shortcut"))
        .collect();

    report(
        "CRITICAL: unwrap()/expect() found in production code!",
        &[
            "✅ REQUIRED: propagate with `?`, or map to SessionError / ConfigError",
            "✅ UI: show the failure through NavState::ErrorDisplay",
        ],
        &violations,
    );
}
