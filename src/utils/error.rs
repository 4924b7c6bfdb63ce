use thiserror::Error;

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Invalid parameter '{field}' = {value}: {reason}")]
    InvalidParameter {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Timestamp file '{path}' is unusable: {message}")]
    TimestampError { path: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Storage,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 非零退出碼：處理錯誤 1、可重試 2、系統錯誤 3
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SurveyError {
    pub fn invalid_parameter(
        field: &str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        SurveyError::InvalidParameter {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// 取得出錯欄位名稱
    pub fn field(&self) -> Option<&str> {
        match self {
            SurveyError::InvalidParameter { field, .. }
            | SurveyError::ConfigValidationError { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SurveyError::InvalidParameter { .. } => ErrorCategory::Input,
            SurveyError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            SurveyError::TimestampError { .. } | SurveyError::IoError(_) => ErrorCategory::Storage,
            SurveyError::SerializationError(_) | SurveyError::CsvError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            // 時間戳檔案壞掉可重建，重跑即可
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SurveyError::InvalidParameter { field, .. } => match field.as_str() {
                "margin_of_error" => "Use a margin of error greater than 0 and at most 1, e.g. 0.05".to_string(),
                "proportion_p" => "Use a proportion between 0 and 1; 0.5 is the conservative choice".to_string(),
                "confidence_z" => "Use a positive z-score, e.g. 1.96 for 95% confidence".to_string(),
                "confidence_level" => "Use a confidence level between 0 and 1 (or a percentage such as 95)".to_string(),
                "population_size" => "Use a population size of at least 1, or omit it for a very large population".to_string(),
                _ => format!("Check the value of '{}'", field),
            },
            SurveyError::ConfigValidationError { field, .. } => {
                format!("Fix '{}' in the configuration file", field)
            }
            SurveyError::TimestampError { path, .. } => {
                format!("Delete '{}' so it can be recreated", path)
            }
            SurveyError::IoError(_) => "Check that the file exists and is accessible".to_string(),
            SurveyError::SerializationError(_) | SurveyError::CsvError(_) => {
                "Report this problem; the output could not be encoded".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SurveyError::InvalidParameter { field, value, reason } => {
                format!("입력값 오류: {} = {} ({})", field, value, reason)
            }
            SurveyError::ConfigValidationError { field, message } => {
                format!("설정 오류: {} ({})", field, message)
            }
            SurveyError::TimestampError { path, message } => {
                format!("수정 시각 파일 오류: {} ({})", path, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_carries_field_and_value() {
        let err = SurveyError::invalid_parameter("margin_of_error", 0.0, "must be greater than 0");
        assert_eq!(err.field(), Some("margin_of_error"));
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("margin_of_error"));
        assert!(err.recovery_suggestion().contains("0.05"));
    }

    #[test]
    fn test_storage_errors_are_medium() {
        let err = SurveyError::TimestampError {
            path: ".last_modified".to_string(),
            message: "not a number".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.field().is_none());
    }

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = [
            SurveyError::invalid_parameter("proportion_p", 2.0, "out of range"),
            SurveyError::ConfigValidationError {
                field: "format".to_string(),
                message: "bad".to_string(),
            },
            SurveyError::IoError(std::io::Error::other("disk")),
            SurveyError::CsvError(csv::Error::from(std::io::Error::other("sink"))),
        ];
        let codes: Vec<i32> = errors.iter().map(|e| e.severity().exit_code()).collect();
        assert_eq!(codes, vec![1, 1, 2, 3]);
    }
}
