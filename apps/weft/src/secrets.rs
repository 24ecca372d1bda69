//! Secret reference validation.
//!
//! Two distinct shapes are validated: `${{ secrets.* }}` expressions and
//! literal secret names. Expression failures use a fixed, value-free error
//! message because the evaluated text may embed secret names; literal name
//! failures carry the offending value plus naming guidance.

use crate::error::{Error, Result, ValidationError};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Matches `${{ secrets.NAME }}` or an OR-chain
/// `${{ secrets.NAME1 || secrets.NAME2 || ... }}`, anchored at both ends
/// with permissive internal whitespace.
fn secrets_expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\$\{\{\s*secrets\.[A-Za-z_][A-Za-z0-9_]*(\s*\|\|\s*secrets\.[A-Za-z_][A-Za-z0-9_]*)*\s*\}\}$",
        )
        .expect("secrets expression pattern compiles")
    })
}

fn secret_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("secret name pattern compiles"))
}

/// Validate that a value is a proper GitHub Actions secrets expression.
///
/// The value is never echoed into logs or the returned error; only the
/// boolean outcome is observable.
pub fn validate_secrets_expression(value: &str) -> Result<()> {
    if !secrets_expression_pattern().is_match(value) {
        debug!("invalid secrets expression detected");
        return Err(Error::SecretsExpression);
    }
    debug!("valid secrets expression validated");
    Ok(())
}

/// Validate literal secret names against environment variable naming rules.
/// The first violation short-circuits.
pub fn validate_secret_references(secrets: &[String]) -> Result<()> {
    debug!("validating secret references: checking {} secret(s)", secrets.len());
    for secret in secrets {
        if !secret_name_pattern().is_match(secret) {
            debug!("invalid secret name format: {secret}");
            return Err(ValidationError::new(
                "secrets",
                secret,
                "invalid secret name format - must follow environment variable naming conventions",
                "Secret names must:\n\
                 - Start with an uppercase letter\n\
                 - Contain only uppercase letters, numbers, and underscores\n\
                 \n\
                 Examples:\n\
                 \x20 MY_SECRET_KEY      ✓\n\
                 \x20 API_TOKEN_123      ✓\n\
                 \x20 mySecretKey        ✗ (lowercase)\n\
                 \x20 123_SECRET         ✗ (starts with number)\n\
                 \x20 MY-SECRET          ✗ (hyphens not allowed)",
            )
            .into());
        }
    }
    Ok(())
}
