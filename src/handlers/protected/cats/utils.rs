use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::cat::Cat;
use crate::error::ApiError;
use crate::validation::ValidationErrors;

/// `{message, data}` envelope used by the mutating cat endpoints.
pub fn db_message(message: &str, cat: &Cat) -> Value {
    json!({
        "message": message,
        "data": cat.to_api(),
    })
}

pub fn cats_to_api(cats: &[Cat]) -> Value {
    Value::Array(cats.iter().map(Cat::to_api).collect())
}

/// Parse the path id, recording a validation error instead of failing hard.
pub fn parse_cat_id(raw: &str, errors: &mut ValidationErrors) -> Option<Uuid> {
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push("Invalid value", "id");
            None
        }
    }
}

/// Fail fast with one aggregated 400 when any validation check failed.
pub fn reject_invalid(errors: &ValidationErrors) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(errors.joined_message()))
    }
}

/// Unwrap a value produced by a validation check. Absence means the check
/// already recorded an error, so the aggregated 400 is returned.
pub fn required<T>(value: Option<T>, errors: &ValidationErrors) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::bad_request(errors.joined_message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_becomes_field_error() {
        let mut errors = ValidationErrors::new();
        assert!(parse_cat_id("not-a-uuid", &mut errors).is_none());
        assert_eq!(errors.joined_message(), "Invalid value: id");
        assert!(reject_invalid(&errors).is_err());
    }

    #[test]
    fn valid_id_parses_clean() {
        let mut errors = ValidationErrors::new();
        let id = parse_cat_id("0d5ad1ab-3b24-4b66-9a0c-0efb84ad1e84", &mut errors);
        assert!(id.is_some());
        assert!(reject_invalid(&errors).is_ok());
    }
}
