//! Weft CLI binary entry point.
//! Delegates to modules for compile/lint and prints results.

mod actionlint;
mod cli;
mod compile;
mod concurrency;
mod config;
mod error;
mod frontmatter;
mod models;
mod output;
mod secrets;
mod value;

use clap::Parser;
use cli::{Cli, Commands};
use models::actionlint::ActionlintStats;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("weft {}", env!("CARGO_PKG_VERSION"));
            if let Ok(version) = actionlint::get_actionlint_version() {
                if !version.is_empty() {
                    println!("actionlint {version}");
                }
            }
        }
        Commands::Compile {
            repo_root,
            dir,
            output,
            engine,
            no_validate,
            verbose,
            patterns,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                dir.as_deref(),
                output.as_deref(),
                engine.as_deref(),
                if no_validate { Some(false) } else { None },
                if verbose { Some(true) } else { None },
            );
            // Friendly note if no weft config was found
            if eff.output != "json" && config::load_config(&eff.repo_root).is_none() {
                eprintln!(
                    "{} {}",
                    output::note_prefix(),
                    "No weft.toml found; using defaults."
                );
            }
            let (results, summary) = compile::run_compile(&eff, &patterns);
            output::print_compile(&results, &summary, &eff.output, &eff.repo_root);

            let mut exit_code = if summary.failed > 0 { 1 } else { 0 };
            if eff.validate {
                // Fresh statistics per run; lock files lint sequentially so
                // the shared aggregate has a single writer.
                let mut stats = ActionlintStats::new();
                for result in results.iter().filter(|r| r.ok) {
                    match actionlint::lint_workflow_file(
                        Path::new(&result.lock_file),
                        eff.verbose,
                        &mut stats,
                    ) {
                        Ok((count, _)) if count > 0 => exit_code = 1,
                        Ok(_) => {}
                        Err(e) => {
                            eprintln!(
                                "{} {}",
                                output::error_prefix(),
                                format!("{}: {}", result.lock_file, e)
                            );
                            exit_code = 1;
                        }
                    }
                }
                actionlint::display_actionlint_summary(Some(&stats));
            }
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Commands::Lint {
            repo_root,
            dir,
            verbose,
            patterns,
        } => {
            let eff = config::resolve_effective(
                repo_root.as_deref(),
                dir.as_deref(),
                None,
                None,
                None,
                if verbose { Some(true) } else { None },
            );
            let effective_patterns: Vec<String> = if patterns.is_empty() {
                vec![format!("{}/*.lock.yml", eff.dir)]
            } else {
                patterns
            };
            let mut targets: Vec<PathBuf> = Vec::new();
            for pat in &effective_patterns {
                let pattern = eff.repo_root.join(pat).to_string_lossy().to_string();
                for entry in glob::glob(&pattern).expect("bad glob pattern") {
                    if let Ok(p) = entry {
                        targets.push(p);
                    }
                }
            }
            targets.sort();
            if targets.is_empty() {
                eprintln!(
                    "{} {}",
                    output::note_prefix(),
                    "No lock files matched; run `weft compile` first."
                );
                std::process::exit(2);
            }
            let mut stats = ActionlintStats::new();
            let mut exit_code = 0;
            for target in &targets {
                match actionlint::lint_workflow_file(target, eff.verbose, &mut stats) {
                    Ok((count, _)) if count > 0 => exit_code = 1,
                    Ok(_) => {}
                    Err(e) => {
                        eprintln!(
                            "{} {}",
                            output::error_prefix(),
                            format!("{}: {}", target.display(), e)
                        );
                        exit_code = 1;
                    }
                }
            }
            actionlint::display_actionlint_summary(Some(&stats));
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
