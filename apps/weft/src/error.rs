//! Error types for weft.
//!
//! Parse and validation failures surface to the caller as `Error` values;
//! the defensive map accessors in `value` absorb failures via fallbacks
//! instead and never raise.

use thiserror::Error;

/// Result type alias for weft operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Frontmatter block is malformed (unterminated fence, non-mapping root).
    #[error("invalid frontmatter: {0}")]
    Frontmatter(String),

    #[error("import '{path}' could not be loaded: {reason}")]
    Import { path: String, reason: String },

    /// Fixed message with generic examples only. The offending value may
    /// embed secret names, so it must never appear in this error or in logs.
    #[error("invalid secrets expression: must be a GitHub Actions expression with secrets reference (e.g., '${{{{ secrets.MY_SECRET }}}}' or '${{{{ secrets.SECRET1 || secrets.SECRET2 }}}}')")]
    SecretsExpression,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Actionlint emitted something that is not its JSON diagnostics array.
    /// Never downgraded to "zero issues".
    #[error("actionlint produced unparsable output: {0}")]
    ActionlintOutput(serde_json::Error),

    #[error("failed to run actionlint: {0}")]
    ActionlintSpawn(std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
#[error("invalid value '{value}' for '{field}': {reason}\n{guidance}")]
/// Structured validation failure carrying the offending field and value, a
/// short machine-usable reason, and multi-line human guidance.
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub reason: String,
    pub guidance: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
        guidance: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            guidance: guidance.into(),
        }
    }
}
