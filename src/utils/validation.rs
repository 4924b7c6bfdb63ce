use crate::utils::error::{Result, SurveyError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const OUTPUT_FORMATS: [&str; 3] = ["text", "json", "csv"];

pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SurveyError::invalid_parameter(
            field_name,
            value,
            "Value must be a finite number",
        ));
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value <= 0.0 {
        return Err(SurveyError::invalid_parameter(
            field_name,
            value,
            "Value must be greater than 0",
        ));
    }
    Ok(())
}

pub fn validate_range(field_name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    validate_finite(field_name, value)?;
    if value < min || value > max {
        return Err(SurveyError::invalid_parameter(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// `(0, max]`
pub fn validate_half_open(field_name: &str, value: f64, max: f64) -> Result<()> {
    validate_positive(field_name, value)?;
    if value > max {
        return Err(SurveyError::invalid_parameter(
            field_name,
            value,
            format!("Value must be greater than 0 and at most {}", max),
        ));
    }
    Ok(())
}

pub fn validate_population(field_name: &str, value: u64) -> Result<()> {
    if value < 1 {
        return Err(SurveyError::invalid_parameter(
            field_name,
            value,
            "Population size must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SurveyError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SurveyError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_output_format(field_name: &str, format: &str) -> Result<()> {
    if !OUTPUT_FORMATS.contains(&format) {
        return Err(SurveyError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!(
                "Unsupported format '{}'. Valid formats: {}",
                format,
                OUTPUT_FORMATS.join(", ")
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_range() {
        assert!(validate_range("proportion_p", 0.0, 0.0, 1.0).is_ok());
        assert!(validate_range("proportion_p", 1.0, 0.0, 1.0).is_ok());
        assert!(validate_range("proportion_p", 1.01, 0.0, 1.0).is_err());
        assert!(validate_range("proportion_p", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_half_open() {
        assert!(validate_half_open("margin_of_error", 0.05, 1.0).is_ok());
        assert!(validate_half_open("margin_of_error", 1.0, 1.0).is_ok());
        assert!(validate_half_open("margin_of_error", 0.0, 1.0).is_err());
        assert!(validate_half_open("margin_of_error", -0.1, 1.0).is_err());
        assert!(validate_half_open("margin_of_error", f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_validate_population() {
        assert!(validate_population("population_size", 1).is_ok());
        let err = validate_population("population_size", 0).unwrap_err();
        assert_eq!(err.field(), Some("population_size"));
    }

    #[test]
    fn test_validate_output_format() {
        assert!(validate_output_format("format", "csv").is_ok());
        assert!(validate_output_format("format", "xml").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("timestamp_file", ".last_modified").is_ok());
        assert!(validate_path("timestamp_file", "").is_err());
        assert!(validate_path("timestamp_file", "a\0b").is_err());
    }
}
