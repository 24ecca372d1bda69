//! Shared data models for compile outputs and workflow structures.

pub mod actionlint;
pub mod workflow;

use serde::Serialize;

#[derive(Serialize)]
/// Outcome of compiling a single workflow file.
pub struct CompileResult {
    pub file: String,
    pub lock_file: String,
    pub ok: bool,
    pub changed: bool,
    pub error: Option<String>,
}

#[derive(Serialize)]
/// Aggregated compile summary used by printers.
pub struct CompileSummary {
    pub compiled: usize,
    pub failed: usize,
    pub files: usize,
}
