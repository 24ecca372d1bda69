//! Output rendering for compile results.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file fields and a top-level summary.

use crate::models::{CompileResult, CompileSummary};
use owo_colors::OwoColorize;
use pathdiff::diff_paths;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Colored stderr prefix for errors.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

/// Colored stderr prefix for friendly notes.
pub fn note_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "⟦note⟧".blue().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}

/// Render a path relative to the repository root for human output.
fn display_path(repo_root: &Path, path: &str) -> String {
    diff_paths(path, repo_root)
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| path.to_string())
}

/// Print compile results in the requested format.
pub fn print_compile(
    results: &[CompileResult],
    summary: &CompileSummary,
    output: &str,
    repo_root: &Path,
) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_compile_json(results, summary)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for r in results {
                if r.ok {
                    let status = if r.changed { "✔ compiled:" } else { "• up to date:" };
                    let line = format!(
                        "{} -> {}",
                        display_path(repo_root, &r.file),
                        display_path(repo_root, &r.lock_file)
                    );
                    if color {
                        if r.changed {
                            println!("{} {}", status.green().bold(), line);
                        } else {
                            println!("{} {}", status.bright_black(), line);
                        }
                    } else {
                        println!("{status} {line}");
                    }
                } else {
                    let message = r.error.as_deref().unwrap_or("unknown error");
                    let sev = if color {
                        "⟦error⟧".red().bold().to_string()
                    } else {
                        "⟦error⟧".to_string()
                    };
                    let file = if color {
                        display_path(repo_root, &r.file).bold().to_string()
                    } else {
                        display_path(repo_root, &r.file)
                    };
                    println!("✖ {} {} — {}", sev, file, message);
                }
            }
            let line = format!(
                "— Summary — compiled={} failed={} files={}",
                summary.compiled, summary.failed, summary.files
            );
            if color {
                println!("{}", line.bold());
            } else {
                println!("{line}");
            }
        }
    }
}

/// Compose compile JSON object (pure) for testing/snapshot purposes.
pub fn compose_compile_json(results: &[CompileResult], summary: &CompileSummary) -> JsonVal {
    json!({
        "results": results,
        "summary": summary,
    })
}
