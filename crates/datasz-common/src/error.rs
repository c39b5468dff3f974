//! Error types for the data-size estimator.

use thiserror::Error;

/// Result type alias using DataszError.
pub type DataszResult<T> = Result<T, DataszError>;

/// Primary error type for estimation runs.
///
/// Every variant is fatal: a partial estimate would under-report cost, so
/// the run aborts on the first failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataszError {
    // === Configuration Errors ===
    #[error("Cannot find configuration setting: {section}={option}")]
    MissingConfig { section: String, option: String },

    #[error("Invalid value '{value}' for configuration setting {section}={option}: {reason}")]
    InvalidConfig {
        section: String,
        option: String,
        value: String,
        reason: String,
    },

    #[error("Configuration syntax error at line {line}: {message}")]
    ConfigSyntax { line: usize, message: String },

    // === Metadata Errors ===
    #[error("STASHmaster error: {0}")]
    Metadata(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),
}

impl DataszError {
    pub fn missing(section: &str, option: &str) -> Self {
        DataszError::MissingConfig {
            section: section.to_string(),
            option: option.to_string(),
        }
    }

    pub fn invalid(section: &str, option: &str, value: &str, reason: impl Into<String>) -> Self {
        DataszError::InvalidConfig {
            section: section.to_string(),
            option: option.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the configuration side of the taxonomy (missing or malformed facts).
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DataszError::MissingConfig { .. }
                | DataszError::InvalidConfig { .. }
                | DataszError::ConfigSyntax { .. }
        )
    }
}

impl From<std::io::Error> for DataszError {
    fn from(err: std::io::Error) -> Self {
        DataszError::Io(err.to_string())
    }
}
