//! Integration Test: Layering
//!
//! **Policy**: `core/` is the headless session engine. It must build and be
//! testable without a terminal, so it never names the UI stack.
//!
//! **Policy**: the TUI talks to storage, highlighting and assistants only
//! through `parley_core`. It never reaches for the adapter crates directly.

use architectural_enforcement::{dependency_names, production_lines, report};

const UI_CRATES: &[&str] = &["ratatui", "crossterm"];
const ADAPTER_CRATES: &[&str] = &["rusqlite", "syntect", "reqwest"];

#[test]
fn test_core_does_not_depend_on_ui_crates() {
    let violations: Vec<String> = dependency_names("core")
        .into_iter()
        .filter(|name| UI_CRATES.contains(&name.as_str()))
        .map(|name| format!("core/Cargo.toml - UI dependency: {name}"))
        .collect();

    report(
        "CRITICAL: core depends on the terminal UI stack!",
        &["Move terminal code into tui/ and keep core headless."],
        &violations,
    );
}

#[test]
fn test_core_sources_do_not_name_ui_crates() {
    let violations: Vec<String> = production_lines("core/src")
        .iter()
        .filter(|line| {
            let code = line.code();
            UI_CRATES.iter().any(|c| code.contains(&format!("{c}::")))
        })
        .map(|line| line.describe("UI crate in core"))
        .collect();

    report(
        "CRITICAL: core source uses the terminal UI stack!",
        &["Rendering produces bytes; drawing them is the TUI's job."],
        &violations,
    );
}

#[test]
fn test_tui_goes_through_core_adapters() {
    let mut violations: Vec<String> = production_lines("tui/src")
        .iter()
        .filter(|line| {
            let code = line.code();
            ADAPTER_CRATES.iter().any(|c| code.contains(&format!("{c}::")))
        })
        .map(|line| line.describe("Adapter crate used directly"))
        .collect();

    violations.extend(
        dependency_names("tui")
            .into_iter()
            .filter(|name| ADAPTER_CRATES.contains(&name.as_str()))
            .map(|name| format!("tui/Cargo.toml - adapter dependency: {name}")),
    );

    report(
        "CRITICAL: TUI bypasses the core adapters!",
        &[
            "Use parley_core::{ConversationStore, Renderer, Assistant} instead.",
        ],
        &violations,
    );
}

#[test]
fn test_tui_depends_on_core() {
    assert!(
        dependency_names("tui").iter().any(|n| n == "parley-core"),
        "tui must depend on parley-core"
    );
}
