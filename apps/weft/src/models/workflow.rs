//! Workflow data produced by the compile pipeline.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
/// Execution engine configuration from the `engine:` frontmatter field.
pub struct EngineConfig {
    pub id: String,
    /// Explicit job-level concurrency override text; empty means unset.
    pub concurrency: String,
}

#[derive(Debug, Clone, Default)]
/// Compiled in-memory representation of one workflow markdown file.
pub struct WorkflowData {
    pub name: String,
    /// The serialized `on:` block. Trigger classification operates on this
    /// raw text, never on a parsed structure.
    pub on: String,
    /// Explicit workflow-level concurrency override text; empty means unset.
    pub concurrency: String,
    pub engine: Option<EngineConfig>,
    /// Serialized `permissions:` block embedded verbatim in the lock file.
    pub permissions: String,
    /// Literal secret names exposed to the agent job as env vars.
    pub secrets: Vec<String>,
    /// Validated `${{ secrets.* }}` expression for the job token, or empty.
    pub github_token: String,
    /// Merged feature set (top-level frontmatter plus imports).
    pub features: Map<String, Value>,
    /// Whether the workflow is activated by the comment-command pattern.
    pub command: bool,
    /// Whether the agent job checks out the repository first.
    pub checkout: bool,
    pub timeout_minutes: i64,
    /// Markdown body, embedded as the agent prompt.
    pub markdown: String,
}
