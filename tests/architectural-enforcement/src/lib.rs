//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The session engine (`core/`) never depends on the terminal UI stack
//! - Persistence, highlighting and HTTP stay behind the core adapters
//! - No thread sleeps or panicking shortcuts in production code
//!
//! The helpers here walk the workspace sources and hand each test the
//! production part of every file (everything above its `#[cfg(test)]` module).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// One line of production source
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub path: PathBuf,
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    /// Code part of the line, comments removed
    pub fn code(&self) -> &str {
        let trimmed = self.text.trim_start();
        if trimmed.starts_with("//") {
            return "";
        }
        self.text.split("//").next().unwrap_or(&self.text)
    }

    /// `path:line - text` for failure reports
    pub fn describe(&self, what: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            self.number,
            what,
            self.text.trim()
        )
    }
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Production lines of every file under `dir`
pub fn production_lines(dir: &str) -> Vec<SourceLine> {
    let mut out = Vec::new();
    for path in rust_files(dir) {
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        for (idx, line) in content.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            out.push(SourceLine {
                path: path.clone(),
                number: idx + 1,
                text: line.to_string(),
            });
        }
    }
    out
}

/// Names listed under `[dependencies]` in a member's Cargo.toml
pub fn dependency_names(member: &str) -> Vec<String> {
    let manifest = workspace_root().join(member).join("Cargo.toml");
    let content = fs::read_to_string(manifest).unwrap_or_default();

    let mut in_deps = false;
    let mut names = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line == "[dependencies]";
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

/// Panic with a readable report when `violations` is non-empty
pub fn report(title: &str, hints: &[&str], violations: &[String]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    if !hints.is_empty() {
        eprintln!();
        for hint in hints {
            eprintln!("  {hint}");
        }
    }

    panic!(
        "\nFound {} violation(s).\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_members() {
        let root = workspace_root();
        assert!(root.join("core").join("Cargo.toml").exists());
        assert!(root.join("tui").join("Cargo.toml").exists());
    }

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let lines = production_lines("tests/architectural-enforcement/src");
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| !l.text.contains("fn test_workspace_root_has_members")));
    }

    #[test]
    fn test_comment_lines_have_no_code() {
        let line = SourceLine {
            path: PathBuf::from("x.rs"),
            number: 1,
            text: "    // thread::sleep".to_string(),
        };
        assert_eq!(line.code(), "");
    }
}
