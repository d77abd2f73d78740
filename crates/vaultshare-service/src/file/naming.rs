//! File name sanitization.

use vaultshare_core::error::AppError;
use vaultshare_core::result::AppResult;

/// Longest display name accepted, in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// Reduce a caller-supplied name to alphanumerics, `.`, `_`, `-`, and
/// spaces, trimmed.
///
/// Fails with `InvalidRequest` when nothing usable remains, the result
/// is only dots, or it is longer than [`MAX_NAME_LENGTH`] bytes.
pub fn sanitize_filename(name: &str) -> AppResult<String> {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        return Err(AppError::invalid_request(format!(
            "Invalid file name: {name:?}"
        )));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_request(format!(
            "File name is {} bytes, the limit is {MAX_NAME_LENGTH}",
            trimmed.len()
        )));
    }
    Ok(trimmed.to_string())
}

/// Name given to a copy of `name`, cut back to [`MAX_NAME_LENGTH`] bytes.
pub fn copy_name(name: &str) -> AppResult<String> {
    let mut copied = format!("Copy of {name}");
    if copied.len() > MAX_NAME_LENGTH {
        let mut end = MAX_NAME_LENGTH;
        while !copied.is_char_boundary(end) {
            end -= 1;
        }
        copied.truncate(end);
    }
    sanitize_filename(&copied)
}
