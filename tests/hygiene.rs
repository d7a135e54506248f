//! Hygiene: enforces coding standards at test time
//!
//! These tests scan `src/` for antipatterns. Each has a budget (ideally zero).
//! The budget never grows: fix an existing hit before adding a new one.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// Pattern, budget, and why it is banned.
const BUDGETS: &[(&str, usize, &str)] = &[
    // Panics: a broken page is worse than a missing enhancement.
    (".unwrap()", 0, "panics on None/Err"),
    (".expect(", 0, "panics on None/Err"),
    ("panic!(", 0, "explicit panic"),
    ("unreachable!(", 0, "explicit panic"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    // Silent loss: errors must be logged or mapped.
    ("let _ =", 0, "discards a result without inspecting it"),
    (".ok()", 0, "drops the error value"),
    (".unwrap_or_default();", 0, "discards a result as a statement"),
    // Structure.
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

/// Files allowed to touch the browser bindings directly.
const BROWSER_FILES: &[&str] = &["lib.rs", "web.rs"];

/// Collect production `.rs` files from `src/`, excluding test files.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

fn format_hits(hits: &[(String, usize)]) -> String {
    hits.iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn source_tree_is_found() {
    assert!(!source_files().is_empty(), "run from the crate root");
}

#[test]
fn antipattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for (pattern, max, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > *max {
            failures.push(format!(
                "{pattern} ({why}): found {count}, max {max}\n{}",
                format_hits(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "budget exceeded:\n{}", failures.join("\n"));
}

#[test]
fn browser_bindings_stay_in_adaptors() {
    let files = source_files();
    let leaks: Vec<_> = ["web_sys::", "wasm_bindgen::", "gloo_timers::"]
        .iter()
        .flat_map(|pattern| hits(&files, pattern))
        .filter(|(path, _)| !BROWSER_FILES.iter().any(|name| path.ends_with(name)))
        .collect();
    assert!(
        leaks.is_empty(),
        "browser bindings outside the host adaptors:\n{}",
        format_hits(&leaks)
    );
}

/// `web_sys` type names used by the browser adaptor: the `use web_sys::{..}`
/// list plus qualified `web_sys::Type` paths.
fn web_sys_types(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(start) = source.find("use web_sys::{") {
        let rest = &source[start + "use web_sys::{".len()..];
        let list = rest.split('}').next().unwrap_or_default();
        names.extend(list.split(',').map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned));
    }
    for (index, _) in source.match_indices("web_sys::") {
        let ident: String = source[index + "web_sys::".len()..]
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect();
        if ident.starts_with(|c: char| c.is_ascii_uppercase()) {
            names.push(ident);
        }
    }
    names.sort();
    names.dedup();
    names
}

#[test]
fn web_sys_types_are_enabled_features() {
    let adaptor = fs::read_to_string("src/host/web.rs").unwrap_or_default();
    let manifest = fs::read_to_string("Cargo.toml").unwrap_or_default();
    let types = web_sys_types(&adaptor);
    assert!(types.iter().any(|t| t == "Element"), "adaptor import list not found");

    let missing: Vec<_> = types
        .iter()
        .filter(|name| !manifest.contains(&format!("\"{name}\"")))
        .collect();
    assert!(missing.is_empty(), "web-sys features missing from Cargo.toml: {missing:?}");
}
