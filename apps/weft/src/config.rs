//! Configuration discovery and effective settings resolution.
//!
//! Weft reads `weft.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `dir`: `.github/workflows`
//! - `output`: `human`
//! - `validate`: true
//! - `engine`: none
//!
//! Overrides precedence: CLI > config file > defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `weft.toml|yaml`.
pub struct WeftConfig {
    /// Directory holding workflow markdown sources, relative to the root.
    pub dir: Option<String>,
    pub output: Option<String>,
    /// Default engine id applied when frontmatter does not name one.
    pub engine: Option<String>,
    /// Run actionlint over generated lock files.
    pub validate: Option<bool>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub dir: String,
    pub output: String,
    pub engine: Option<String>,
    pub validate: bool,
    pub verbose: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `weft.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("weft.toml").exists()
            || cur.join("weft.yaml").exists()
            || cur.join("weft.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `WeftConfig` from `weft.toml` or `weft.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<WeftConfig> {
    let toml_path = root.join("weft.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: WeftConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["weft.yaml", "weft.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: WeftConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_engine: Option<&str>,
    cli_validate: Option<bool>,
    cli_verbose: Option<bool>,
) -> Effective {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = load_config(&repo_root).unwrap_or_default();

    let dir = cli_dir
        .map(|s| s.to_string())
        .or(cfg.dir)
        .unwrap_or_else(|| ".github/workflows".to_string());

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let engine = cli_engine.map(|s| s.to_string()).or(cfg.engine);

    let validate = cli_validate.or(cfg.validate).unwrap_or(true);
    let verbose = cli_verbose.or(cfg.verbose).unwrap_or(false);

    Effective {
        repo_root,
        dir,
        output,
        engine,
        validate,
        verbose,
    }
}
