//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use trellis_core::domain::IssueStatus;
use trellis_core::validation::is_valid_status;

/// Validate an entity reference: a display number like `I-3` or a raw id.
pub fn validate_reference(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Reference cannot be empty".to_string());
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Invalid reference '{s}': must not contain whitespace"));
    }

    Ok(s.to_string())
}

/// Validate an issue status name.
pub fn validate_status(s: &str) -> Result<String, String> {
    let s = s.trim();

    if is_valid_status(s) {
        return Ok(s.to_string());
    }

    let valid: Vec<&str> = IssueStatus::ALL.iter().map(|status| status.as_str()).collect();
    Err(format!(
        "Invalid status '{s}'. Expected one of: {}",
        valid.join(", ")
    ))
}
