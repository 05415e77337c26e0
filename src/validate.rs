use std::collections::HashSet;

use crate::error::{ErrorCode, FieldError};
use crate::models::NewEnvironmentVariable;

pub const NAME_MAX_CHARS: usize = 200;
pub const VALUE_MAX_CHARS: usize = 1000;
pub const EMAIL_MAX_CHARS: usize = 254;

/// Input checks that need no database access.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldError>;
}

/// Names are compared and stored trimmed; blank and over-long names are rejected.
pub fn name(field: &str, value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::invalid(field, "This field may not be blank."));
    }
    text(field, trimmed, NAME_MAX_CHARS)
}

/// Free text stored as Postgres TEXT, which cannot hold NUL.
pub fn text(field: &str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.contains('\0') {
        return Err(FieldError::invalid(field, "Null characters are not allowed."));
    }
    max_chars(field, value, max)
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::invalid(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

pub fn non_negative(field: &str, value: f64) -> Result<(), FieldError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FieldError::invalid(
            field,
            "Ensure this value is a finite number greater than or equal to 0.",
        ));
    }
    Ok(())
}

/// Checks a submitted batch in order and reports the first bad entry.
/// Names must be unique within the batch after trimming.
pub fn environment_variables(variables: &[NewEnvironmentVariable]) -> Result<(), FieldError> {
    let mut seen = HashSet::with_capacity(variables.len());

    for (index, variable) in variables.iter().enumerate() {
        let name_field = format!("environment_variables[{index}].name");
        name(&name_field, &variable.name)?;
        text(
            &format!("environment_variables[{index}].value"),
            &variable.value,
            VALUE_MAX_CHARS,
        )?;

        let trimmed = variable.name.trim();
        if !seen.insert(trimmed) {
            return Err(FieldError::new(
                ErrorCode::DuplicateEnvVarName,
                name_field,
                format!("Environment variable names must be unique; '{trimmed}' is repeated."),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, value: &str) -> NewEnvironmentVariable {
        NewEnvironmentVariable {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn blank_name_rejected() {
        let err = name("name", "   ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, "name");
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(name("name", &"é".repeat(200)).is_ok());
        assert!(name("name", &"é".repeat(201)).is_err());
    }

    #[test]
    fn non_negative_rejects_negative_and_nan() {
        assert!(non_negative("cpu", 0.0).is_ok());
        assert!(non_negative("cpu", 2.5).is_ok());
        assert!(non_negative("cpu", -0.1).is_err());
        assert!(non_negative("cpu", f64::NAN).is_err());
        assert!(non_negative("cpu", f64::INFINITY).is_err());
    }

    #[test]
    fn duplicate_variable_names_rejected() {
        let err = environment_variables(&[var("X", "1"), var("X", "2")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEnvVarName);
        assert_eq!(err.field, "environment_variables[1].name");
    }

    #[test]
    fn names_compared_after_trimming() {
        let err = environment_variables(&[var("PORT", "1"), var(" PORT ", "2")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEnvVarName);
    }

    #[test]
    fn first_violation_wins() {
        let err = environment_variables(&[var("A", "1"), var("", "2"), var("A", "3")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, "environment_variables[1].name");
    }

    #[test]
    fn value_length_limited() {
        assert!(environment_variables(&[var("A", &"v".repeat(1000))]).is_ok());
        let err = environment_variables(&[var("A", &"v".repeat(1001))]).unwrap_err();
        assert_eq!(err.field, "environment_variables[0].value");
    }

    #[test]
    fn null_characters_rejected() {
        let err = name("name", "a\0b").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, "name");

        let err = environment_variables(&[var("A", "1"), var("B", "x\0y")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, "environment_variables[1].value");

        let err = environment_variables(&[var("A\0", "1")]).unwrap_err();
        assert_eq!(err.field, "environment_variables[0].name");
    }

    #[test]
    fn empty_values_and_batches_allowed() {
        assert!(environment_variables(&[]).is_ok());
        assert!(environment_variables(&[var("EMPTY", "")]).is_ok());
    }
}
