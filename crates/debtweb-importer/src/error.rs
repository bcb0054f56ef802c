//! Error types for debtweb-importer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Workbook not found: {path}")]
    NotFound { path: String },

    #[error("Cannot open workbook {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Cannot read sheet '{sheet}': {message}")]
    SheetError { sheet: String, message: String },

    #[error("Import task failed: {0}")]
    TaskFailed(String),
}
