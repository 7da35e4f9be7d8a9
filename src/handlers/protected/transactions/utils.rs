use std::collections::HashMap;

use crate::error::ApiError;

/// Parse the `:id` path segment, reporting a bad value as a validation error
pub fn parse_transaction_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let mut field_errors = HashMap::new();
            field_errors.insert("id".to_string(), format!("'{}' is not a transaction id", raw));
            Err(ApiError::validation_error("Invalid transaction id", Some(field_errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_integers() {
        assert_eq!(parse_transaction_id("42").unwrap(), 42);
    }

    #[test]
    fn rejects_everything_else() {
        for raw in ["0", "-1", "abc", "1.5", ""] {
            let err = parse_transaction_id(raw).unwrap_err();
            assert_eq!(err.error_code(), "VALIDATION_ERROR", "{raw}");
        }
    }
}
