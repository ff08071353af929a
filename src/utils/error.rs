use thiserror::Error;

#[derive(Error, Debug)]
pub enum CensusError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{table} structure check failed: {reason}")]
    StructuralError { table: String, reason: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    System,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl CensusError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CensusError::CsvError(_)
            | CensusError::ZipError(_)
            | CensusError::StructuralError { .. }
            | CensusError::ValidationError { .. } => ErrorCategory::Input,
            CensusError::ConfigError { .. }
            | CensusError::InvalidConfigValueError { .. }
            | CensusError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CensusError::ApiError(_) => ErrorCategory::Network,
            CensusError::IoError(_) => ErrorCategory::System,
            CensusError::SerializationError(_) | CensusError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            CensusError::StructuralError { table, reason } => {
                format!(
                    "The uploaded {} file does not look like an ABS DataPack table: {}",
                    table, reason
                )
            }
            CensusError::CsvError(_) => "The CSV file could not be read".to_string(),
            CensusError::ZipError(_) => "The DataPack archive could not be opened".to_string(),
            CensusError::ApiError(_) => "The ratings service could not be reached".to_string(),
            CensusError::IoError(e) => format!("File access failed: {}", e),
            CensusError::MissingConfigError { field } => {
                format!("Missing required setting '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the file is an unmodified ABS Census DataPack export for the selected table"
            }
            ErrorCategory::Configuration => "Review the TOML configuration and command-line flags",
            ErrorCategory::Network => "Verify the ratings endpoint is reachable and retry",
            ErrorCategory::System => "Check file paths and permissions",
            ErrorCategory::Processing => "Re-run with --verbose and inspect the logged diagnostics",
        }
    }
}

pub type Result<T> = std::result::Result<T, CensusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_error_is_input_category() {
        let err = CensusError::StructuralError {
            table: "G01".to_string(),
            reason: "missing column Tot_P".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("G01"));
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = CensusError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
