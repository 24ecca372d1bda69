//! Actionlint diagnostic and statistics models.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
/// One diagnostic from actionlint's JSON output format.
pub struct ActionlintIssue {
    pub message: String,
    pub filepath: String,
    pub line: usize,
    pub column: usize,
    pub kind: String,
    /// May embed a literal newline followed by a caret-underline marker.
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub end_column: usize,
}

#[derive(Debug, Clone, Default)]
/// Run-wide lint statistics.
///
/// Owned by the compiler run and passed by mutable reference to each
/// per-file lint call; mutated additively for the run's duration and
/// discarded when the run ends. Mutation is sequential; a parallel caller
/// must serialize updates itself.
pub struct ActionlintStats {
    pub total_workflows: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    /// Kind → count, in stable sorted iteration order. Usable from the
    /// moment the stats value exists, even while empty.
    pub errors_by_kind: BTreeMap<String, usize>,
}

impl ActionlintStats {
    /// Fresh zeroed statistics. Create one before a compiler run begins;
    /// reusing a previous run's value carries its counts forward.
    pub fn new() -> Self {
        Self::default()
    }
}
