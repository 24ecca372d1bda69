//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "weft",
    version,
    about = "Weft (Rust + frontmatter)",
    long_about = "Weft — compile agentic workflow markdown into GitHub Actions workflows and validate the output with actionlint.\n\nConfiguration precedence: CLI > weft.toml > defaults.",
    after_help = "Examples:\n  weft compile\n  weft compile .github/workflows/triage.md --verbose\n  weft compile --no-validate --output json\n  weft lint\n  weft version",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for compiling and validating workflows.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the weft version and, when available, the actionlint version."
    )]
    Version,
    /// Compile workflow markdown into lock files
    #[command(
        about = "Compile workflows",
        long_about = "Compile frontmatter-driven workflow markdown into .lock.yml GitHub Actions workflows. Generated files are validated with actionlint unless --no-validate is set.",
        after_help = "Examples:\n  weft compile\n  weft compile workflows/triage.md\n  weft compile --engine claude --output json"
    )]
    Compile {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Workflows directory (default: .github/workflows)")]
        dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Default engine id when frontmatter names none")]
        engine: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip actionlint validation of generated files")]
        no_validate: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show snippets and doc links for lint findings")]
        verbose: bool,
        #[arg(help = "Source patterns relative to the repo root (default: <dir>/*.md)")]
        patterns: Vec<String>,
    },
    /// Validate existing lock files with actionlint
    #[command(
        about = "Lint lock files",
        long_about = "Run actionlint over generated .lock.yml files and print a run summary.",
        after_help = "Examples:\n  weft lint\n  weft lint --verbose"
    )]
    Lint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Workflows directory (default: .github/workflows)")]
        dir: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show snippets and doc links for lint findings")]
        verbose: bool,
        #[arg(help = "Lock file patterns relative to the repo root (default: <dir>/*.lock.yml)")]
        patterns: Vec<String>,
    },
}
