//! Name validation shared by folder and file operations.

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

/// Longest accepted folder or file name, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Validate and normalize a folder or file name.
///
/// Names are trimmed; the result must be non-empty, at most
/// [`MAX_NAME_CHARS`] characters, contain no path separator or control
/// character, and not be `.` or `..`.
pub fn normalize_name(kind: &str, name: &str) -> AppResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{kind} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::validation(format!(
            "{kind} name cannot exceed {MAX_NAME_CHARS} characters"
        )));
    }
    if trimmed.contains(['/', '\\']) || trimmed.chars().any(char::is_control) {
        return Err(AppError::validation(format!(
            "{kind} name contains invalid characters"
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::validation(format!("{kind} name is reserved")));
    }

    Ok(trimmed.to_string())
}
