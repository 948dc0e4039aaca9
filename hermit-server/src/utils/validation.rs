//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen as reasonable UX bounds for names, descriptions and
//! labels; storage imposes no length limits of its own.

use shared::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Listing names
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Short labels: categories, etc.
pub const MAX_LABEL_LEN: usize = 100;

// ── Validation helpers (handlers) ───────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an id path/body parameter looks like a record reference.
pub fn validate_record_id(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() || value.len() > MAX_LABEL_LEN {
        return Err(AppError::validation(format!("{field} is not a valid id")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Desk lamp", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_record_id() {
        assert!(validate_record_id("item:123", "item_id").is_ok());
        assert!(validate_record_id("", "item_id").is_err());
        assert!(validate_record_id(&"x".repeat(500), "item_id").is_err());
    }
}
