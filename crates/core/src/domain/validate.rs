use super::{DomainError, DomainResult};

/// Trim `value` and reject it if nothing is left.
pub fn validate_non_empty(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!(
            "{} must be a non-empty string",
            field
        )));
    }
    Ok(trimmed.to_string())
}

/// Parse a textual id, rejecting anything that is not a non-negative integer.
pub fn parse_id(raw: &str, field: &str) -> DomainResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        DomainError::Validation(format!(
            "{} must be a non-negative integer, got '{}'",
            field, raw
        ))
    })
}
