//! Workflow compilation pipeline.
//!
//! Reads agentic workflow markdown, resolves imports and features,
//! validates secret references, derives concurrency configuration, and
//! emits a `.lock.yml` GitHub Actions workflow beside each source file.
//! Files compile in parallel; each result is independent and the caller
//! runs actionlint over the emitted artifacts sequentially afterwards.

use crate::concurrency::{generate_concurrency_config, generate_job_concurrency_config};
use crate::config::Effective;
use crate::error::Result;
use crate::frontmatter::{extract_frontmatter, load_imported_features, merge_features};
use crate::models::workflow::{EngineConfig, WorkflowData};
use crate::models::{CompileResult, CompileSummary};
use crate::secrets::{validate_secret_references, validate_secrets_expression};
use crate::value::{
    filter_map_keys, get_map_field_as_bool, get_map_field_as_int, get_map_field_as_map,
    get_map_field_as_string, is_empty_or_nil,
};
use glob::glob;
use rayon::prelude::*;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One compiled workflow with its emitted artifact location.
#[derive(Debug)]
pub struct CompiledWorkflow {
    pub data: WorkflowData,
    pub lock_path: PathBuf,
    /// False when the artifact on disk already matched the new content.
    pub changed: bool,
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `key: value` as a YAML fragment: block form for collections,
/// inline form for scalars.
fn render_block(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Object(_) | Value::Array(_) => {
            let body = serde_yaml::to_string(value)?;
            Ok(format!("{key}:\n{}", indent(body.trim_end(), 2)))
        }
        other => Ok(format!("{key}: {}", serde_yaml::to_string(other)?.trim_end())),
    }
}

/// Replace the `command` pseudo-trigger with the comment-command events.
/// The command key itself never reaches the emitted YAML.
fn expand_command_trigger(on_map: &Map<String, Value>) -> Map<String, Value> {
    let mut expanded = filter_map_keys(on_map, &["command"]);
    if !expanded.contains_key("issues") {
        expanded.insert(
            "issues".to_string(),
            json!({"types": ["opened", "edited", "reopened"]}),
        );
    }
    if !expanded.contains_key("issue_comment") {
        expanded.insert(
            "issue_comment".to_string(),
            json!({"types": ["created", "edited"]}),
        );
    }
    expanded
}

fn default_on() -> String {
    "on:\n  workflow_dispatch: null".to_string()
}

/// Build the in-memory workflow representation from parsed frontmatter.
fn build_workflow_data(
    frontmatter: &Map<String, Value>,
    body: &str,
    path: &Path,
    default_engine: Option<&str>,
) -> Result<WorkflowData> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = if is_empty_or_nil(frontmatter.get("name")) {
        stem.clone()
    } else {
        get_map_field_as_string(Some(frontmatter), "name", &stem)
    };

    let mut command = false;
    let on = match frontmatter.get("on") {
        Some(Value::Object(on_map)) => {
            if on_map.contains_key("command") {
                command = true;
                render_block("on", &Value::Object(expand_command_trigger(on_map)))?
            } else {
                render_block("on", &Value::Object(on_map.clone()))?
            }
        }
        Some(Value::String(trigger)) => format!("on: {trigger}"),
        Some(_) => {
            debug!("unusable 'on' value, defaulting to workflow_dispatch");
            default_on()
        }
        None => default_on(),
    };

    let concurrency = match get_map_field_as_map(Some(frontmatter), "concurrency") {
        Some(map) => render_block("concurrency", &Value::Object(map.clone()))?,
        None => String::new(),
    };

    let engine = match frontmatter.get("engine") {
        Some(Value::String(id)) => Some(EngineConfig {
            id: id.clone(),
            concurrency: String::new(),
        }),
        Some(Value::Object(engine_map)) => {
            let id = get_map_field_as_string(Some(engine_map), "id", "");
            let engine_concurrency = match get_map_field_as_map(Some(engine_map), "concurrency") {
                Some(map) => render_block("concurrency", &Value::Object(map.clone()))?,
                None => String::new(),
            };
            Some(EngineConfig {
                id,
                concurrency: engine_concurrency,
            })
        }
        Some(_) => {
            debug!("unusable 'engine' value, ignoring");
            None
        }
        None => default_engine.map(|id| EngineConfig {
            id: id.to_string(),
            concurrency: String::new(),
        }),
    };

    let permissions = match frontmatter.get("permissions") {
        Some(value) => render_block("permissions", value)?,
        None => "permissions: read-all".to_string(),
    };

    let secrets: Vec<String> = match frontmatter.get("secrets") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
        Some(_) => {
            debug!("unusable 'secrets' value, ignoring");
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(WorkflowData {
        name,
        on,
        concurrency,
        engine,
        permissions,
        secrets,
        github_token: get_map_field_as_string(Some(frontmatter), "github-token", ""),
        features: Map::new(),
        command,
        checkout: get_map_field_as_bool(Some(frontmatter), "checkout", true),
        timeout_minutes: get_map_field_as_int(Some(frontmatter), "timeout-minutes", 15),
        markdown: body.to_string(),
    })
}

/// Emit the lock file text for a compiled workflow.
fn emit_lock(workflow: &WorkflowData) -> Result<String> {
    let mut out = String::new();
    out.push_str("# This file was automatically generated by weft. DO NOT EDIT.\n");
    out.push_str("# Edit the source markdown and run `weft compile` to regenerate.\n\n");
    out.push_str(&format!(
        "name: {}\n\n",
        serde_yaml::to_string(&workflow.name)?.trim_end()
    ));
    out.push_str(&workflow.on);
    out.push_str("\n\n");
    out.push_str(&workflow.permissions);
    out.push_str("\n\n");
    out.push_str(&generate_concurrency_config(workflow, workflow.command));
    out.push_str("\n\n");
    out.push_str("jobs:\n");
    out.push_str("  agent:\n");
    out.push_str("    runs-on: ubuntu-latest\n");
    out.push_str(&format!(
        "    timeout-minutes: {}\n",
        workflow.timeout_minutes
    ));
    let job_concurrency = generate_job_concurrency_config(workflow);
    if !job_concurrency.is_empty() {
        out.push_str(&indent(&job_concurrency, 4));
        out.push('\n');
    }
    if !workflow.github_token.is_empty() || !workflow.secrets.is_empty() {
        out.push_str("    env:\n");
        if !workflow.github_token.is_empty() {
            out.push_str(&format!("      GH_TOKEN: {}\n", workflow.github_token));
        }
        for secret in &workflow.secrets {
            out.push_str(&format!("      {secret}: ${{{{ secrets.{secret} }}}}\n"));
        }
    }
    out.push_str("    steps:\n");
    if workflow.checkout {
        out.push_str("      - uses: actions/checkout@v4\n");
    }
    out.push_str("      - name: Write agent prompt\n");
    out.push_str("        run: |\n");
    out.push_str("          cat > \"$RUNNER_TEMP/prompt.md\" << 'WEFT_PROMPT_EOF'\n");
    for line in workflow.markdown.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("          {line}\n"));
        }
    }
    out.push_str("          WEFT_PROMPT_EOF\n");
    if let Some(engine) = &workflow.engine {
        if !engine.id.is_empty() {
            out.push_str(&format!("      - name: Run {}\n", engine.id));
            out.push_str(&format!(
                "        run: {} \"$RUNNER_TEMP/prompt.md\"\n",
                engine.id
            ));
        }
    }
    Ok(out)
}

fn lock_path_for(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}.lock.yml"))
}

/// Compile a single workflow markdown file and write its lock file.
pub fn compile_workflow_file(path: &Path, eff: &Effective) -> Result<CompiledWorkflow> {
    let content = fs::read_to_string(path)?;
    let (frontmatter, body) = extract_frontmatter(&content)?;

    let imports: Vec<String> = match frontmatter.get("imports") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let imported = load_imported_features(base_dir, &imports)?;
    let top_features = get_map_field_as_map(Some(&frontmatter), "features");
    let features = merge_features(top_features, &imported)?;

    let mut workflow = build_workflow_data(&frontmatter, &body, path, eff.engine.as_deref())?;
    workflow.features = features;
    debug!(
        "{}: merged {} feature(s) from {} import(s)",
        path.display(),
        workflow.features.len(),
        imports.len()
    );

    validate_secret_references(&workflow.secrets)?;
    if !workflow.github_token.is_empty() {
        validate_secrets_expression(&workflow.github_token)?;
    }

    let lock_text = emit_lock(&workflow)?;
    let lock_path = lock_path_for(path);
    let changed = match fs::read_to_string(&lock_path) {
        Ok(old) => old != lock_text,
        Err(_) => true,
    };
    if changed {
        fs::write(&lock_path, &lock_text)?;
    }
    Ok(CompiledWorkflow {
        data: workflow,
        lock_path,
        changed,
    })
}

/// Compile all matched workflow sources.
///
/// Files matched by explicit patterns (or the configured workflows dir when
/// none are given) compile in parallel; results come back in deterministic
/// path order. Validation of the emitted artifacts is the caller's second,
/// sequential pass.
pub fn run_compile(eff: &Effective, patterns: &[String]) -> (Vec<CompileResult>, CompileSummary) {
    let root = &eff.repo_root;
    let effective_patterns: Vec<String> = if patterns.is_empty() {
        vec![format!("{}/*.md", eff.dir)]
    } else {
        patterns.to_vec()
    };

    let mut targets: Vec<PathBuf> = Vec::new();
    for pat in &effective_patterns {
        let abs_glob = root.join(pat);
        let pattern = abs_glob.to_string_lossy().to_string();
        for entry in glob(&pattern).expect("bad glob pattern") {
            if let Ok(p) = entry {
                // Generated artifacts are never sources
                if p.to_string_lossy().ends_with(".lock.yml") {
                    continue;
                }
                targets.push(p);
            }
        }
    }
    targets.sort();
    targets.dedup();

    let results: Vec<CompileResult> = targets
        .par_iter()
        .map(|path| match compile_workflow_file(path, eff) {
            Ok(compiled) => CompileResult {
                file: path.to_string_lossy().to_string(),
                lock_file: compiled.lock_path.to_string_lossy().to_string(),
                ok: true,
                changed: compiled.changed,
                error: None,
            },
            Err(e) => CompileResult {
                file: path.to_string_lossy().to_string(),
                lock_file: String::new(),
                ok: false,
                changed: false,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let compiled = results.iter().filter(|r| r.ok).count();
    let failed = results.len() - compiled;
    let summary = CompileSummary {
        compiled,
        failed,
        files: results.len(),
    };
    (results, summary)
}
