use crate::error::AppError;

/// Rejects blank values and values longer than `max` characters.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    max_length(field, value, max)
}

pub(crate) fn max_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_rejects_blank() {
        assert!(matches!(required_text("name", "   ", 10), Err(AppError::Validation(_))));
        assert!(required_text("name", "ok", 10).is_ok());
    }

    #[test]
    fn test_max_length_counts_chars_not_bytes() {
        // 5 chars, 15 bytes
        assert!(max_length("name", "数学数学数", 5).is_ok());
        assert!(max_length("name", "数学数学数学", 5).is_err());
    }
}
