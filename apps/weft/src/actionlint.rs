//! Actionlint invocation and output processing.
//!
//! Runs the external `actionlint` binary over generated lock files, parses
//! its JSON diagnostics, folds them into run-wide statistics, and renders
//! per-issue lines plus the end-of-run summary. The linter's complete
//! output is captured before parsing begins; a truncated capture surfaces
//! as a parse error, never as partial success.

use crate::error::{Error, Result};
use crate::models::actionlint::{ActionlintIssue, ActionlintStats};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;
use tracing::debug;

const ACTIONLINT_DOCS_BASE: &str = "https://github.com/rhysd/actionlint/blob/main/docs/checks.md";

/// Diagnostic messages longer than this are truncated for readability.
const MESSAGE_PREVIEW_LEN: usize = 120;

static ACTIONLINT_VERSION: OnceLock<String> = OnceLock::new();

fn truncate_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    if first_line.chars().count() <= MESSAGE_PREVIEW_LEN {
        return first_line.to_string();
    }
    let head: String = first_line.chars().take(MESSAGE_PREVIEW_LEN).collect();
    format!("{head}...")
}

/// Render one diagnostic as `file:line:col: error: [kind] message`.
pub fn format_actionlint_issue(issue: &ActionlintIssue) -> String {
    format!(
        "{}:{}:{}: error: [{}] {}",
        issue.filepath,
        issue.line,
        issue.column,
        issue.kind,
        truncate_message(&issue.message)
    )
}

/// Parse actionlint's JSON diagnostics and display them.
///
/// Empty output is the defined "no issues" state. Anything non-empty must
/// parse as a JSON array of issues; a malformed payload is a hard error
/// propagated to the caller, never defaulted to zero issues. Each issue is
/// printed, tallied into the returned per-call kind map, and folded into
/// the run-wide stats.
pub fn parse_and_display_actionlint_output(
    stdout: &str,
    verbose: bool,
    stats: &mut ActionlintStats,
) -> Result<(usize, BTreeMap<String, usize>)> {
    if stdout.trim().is_empty() {
        return Ok((0, BTreeMap::new()));
    }

    let issues: Vec<ActionlintIssue> =
        serde_json::from_str(stdout).map_err(Error::ActionlintOutput)?;

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for issue in &issues {
        eprintln!("{}", format_actionlint_issue(issue));
        if verbose {
            if !issue.snippet.is_empty() {
                eprintln!("{}", issue.snippet);
            }
            eprintln!("  see: {}", get_actionlint_docs_url(&issue.kind));
        }
        *kinds.entry(issue.kind.clone()).or_insert(0) += 1;
        stats.total_errors += 1;
        *stats.errors_by_kind.entry(issue.kind.clone()).or_insert(0) += 1;
    }

    Ok((issues.len(), kinds))
}

/// Lint one generated lock file, counting it toward the run statistics.
///
/// Actionlint exits non-zero when it finds issues; only a failure to spawn
/// or unparsable output is an error here.
pub fn lint_workflow_file(
    path: &Path,
    verbose: bool,
    stats: &mut ActionlintStats,
) -> Result<(usize, BTreeMap<String, usize>)> {
    debug!("linting {}", path.display());
    let output = Command::new("actionlint")
        .arg("-format")
        .arg("{{json .}}")
        .arg(path)
        .output()
        .map_err(Error::ActionlintSpawn)?;
    stats.total_workflows += 1;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_and_display_actionlint_output(&stdout, verbose, stats)
}

/// Compose the end-of-run summary. Unset stats produce no output at all.
pub fn compose_actionlint_summary(stats: Option<&ActionlintStats>) -> Option<String> {
    let stats = stats?;
    let mut out = String::new();
    out.push_str("Actionlint Summary\n");
    out.push_str(&format!("Checked {} workflow(s)\n", stats.total_workflows));
    let total = stats.total_errors + stats.total_warnings;
    if total == 0 {
        out.push_str("No issues found\n");
    } else {
        out.push_str(&format!("Found {total} issue(s)\n"));
        out.push_str(&format!(
            "  {} error(s), {} warning(s)\n",
            stats.total_errors, stats.total_warnings
        ));
        out.push_str("Issues by type:\n");
        for (kind, count) in &stats.errors_by_kind {
            out.push_str(&format!("  {kind}: {count}\n"));
        }
    }
    Some(out)
}

/// Print the summary to stderr when stats exist.
pub fn display_actionlint_summary(stats: Option<&ActionlintStats>) {
    if let Some(summary) = compose_actionlint_summary(stats) {
        eprint!("{summary}");
    }
}

/// Documentation URL for a diagnostic kind.
///
/// Well-known kinds map to their specific anchors; everything else gets a
/// `#check-<kind>` anchor, with a redundant leading `check-` stripped first
/// so a kind like `check-x` never yields `#check-check-x`.
pub fn get_actionlint_docs_url(kind: &str) -> String {
    if kind.is_empty() {
        return ACTIONLINT_DOCS_BASE.to_string();
    }
    let anchor = match kind {
        "runner-label" => "check-runner-labels".to_string(),
        "shellcheck" => "check-shellcheck-integ".to_string(),
        "pyflakes" => "check-pyflakes-integ".to_string(),
        "expression" => "check-syntax-expression".to_string(),
        other => format!("check-{}", other.strip_prefix("check-").unwrap_or(other)),
    };
    format!("{ACTIONLINT_DOCS_BASE}#{anchor}")
}

/// Resolve the actionlint version, invoking the binary at most once per
/// process; later calls return the cached value.
pub fn get_actionlint_version() -> Result<String> {
    if let Some(version) = ACTIONLINT_VERSION.get() {
        return Ok(version.clone());
    }
    let output = Command::new("actionlint")
        .arg("-version")
        .output()
        .map_err(Error::ActionlintSpawn)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or("").trim().to_string();
    Ok(ACTIONLINT_VERSION.get_or_init(|| version).clone())
}
