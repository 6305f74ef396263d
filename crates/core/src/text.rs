//! User-entered text validation.
//!
//! Both clients gate free-form text (comment bodies, watermark labels)
//! the same way: trim, reject empty, send the trimmed form.

use crate::error::CoreError;

/// Validate that `input` is non-empty after trimming.
///
/// Returns the trimmed slice, or a `CoreError::Validation` naming the
/// field if nothing but whitespace was entered.
pub fn require_text<'a>(name: &str, input: &'a str) -> Result<&'a str, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    Ok(trimmed)
}
