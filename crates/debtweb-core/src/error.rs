//! Error types for debtweb-core
//!
//! Error codes, severities and API-facing details with suggestions for the
//! debt store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Debt not found
    DebtNotFound,
    /// Route or resource not found
    NotFound,
    /// Workbook could not be imported
    ImportFailed,
    /// Validation error
    ValidationError,
    /// Stored file is not valid JSON of the expected shape
    InvalidFormat,
    /// IO error
    IoError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::DebtNotFound => write!(f, "DEBT_NOT_FOUND"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::ImportFailed => write!(f, "IMPORT_FAILED"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    /// File involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
            file: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.file = Some(file);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        if let Some(ref file) = self.file {
            write!(f, "\nFile: {}", file)?;
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    /// Operation may be affected
    Warning,
    /// Operation failed
    Error,
    /// Application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for debtweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Debt not found: {id}")]
    DebtNotFound { id: String },

    #[error("Import failed: {message}")]
    ImportFailed { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid format in {path}: {message}")]
    InvalidFormat { path: String, message: String },

    #[error("IO error on {path}")]
    IoError { path: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::DebtNotFound { .. } => ErrorCode::DebtNotFound,
            CoreError::ImportFailed { .. } => ErrorCode::ImportFailed,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::DebtNotFound { .. } => ErrorSeverity::Info,
            CoreError::ImportFailed { .. } => ErrorSeverity::Error,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::DebtNotFound { .. } => {
                details = details.with_suggestion(
                    "Debt ids change after a replace import; reload the list first.".to_string(),
                );
                details = details.with_suggestion(
                    "Use the /api/debts endpoint to list all debts.".to_string(),
                );
            }
            CoreError::ImportFailed { message } => {
                details = details.with_detail(serde_json::json!({ "import_message": message }));
                details = details.with_suggestion(
                    "Check that the workbook exists and is a valid .xlsx file.".to_string(),
                );
                details = details.with_suggestion(
                    "Close the workbook in the spreadsheet application and retry.".to_string(),
                );
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::InvalidFormat { path, .. } => {
                details = details.with_file(path.clone());
                details = details.with_suggestion(
                    "Restore the file from a backup or delete it to start over.".to_string(),
                );
            }
            CoreError::IoError { path } => {
                details = details.with_file(path.clone());
                details = details.with_suggestion(
                    "Ensure the data directory exists and is writable.".to_string(),
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<debtweb_importer::ImportError> for CoreError {
    fn from(error: debtweb_importer::ImportError) -> Self {
        CoreError::ImportFailed {
            message: error.to_string(),
        }
    }
}
