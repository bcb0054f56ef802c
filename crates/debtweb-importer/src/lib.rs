//! Spreadsheet debt importer
//!
//! Rebuilds installment records from a hand-maintained debt workbook whose
//! layout is conveyed by cell position, repeated header rows and fill colour.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod adapters;
pub mod error;
pub mod normalize;
pub mod samples;
pub mod scanner;
pub mod status;
pub mod types;
pub mod workbook;

pub use adapters::XlsxWorkbook;
pub use error::ImportError;
pub use samples::fallback_records;
pub use scanner::{ImportRules, SpreadsheetDebtImporter, DEFAULT_ENTITY, LOAN_PLACEHOLDER};
pub use status::{FillTable, PAID_FILLS};
pub use types::{DebtRecord, DebtStatus, InstallmentDate};
pub use workbook::{Cell, CellFill, CellValue, GridSheet, GridWorkbook, Sheet, Workbook};

// ==================== Importer Trait ====================

/// Importer reference type
pub type ImporterRef = Arc<dyn DebtImporterTrait>;

/// Trait for debt importers
#[async_trait]
pub trait DebtImporterTrait: Send + Sync {
    /// Read installments from an already opened workbook
    fn parse(&self, workbook: &dyn Workbook) -> Vec<DebtRecord>;

    /// Open a workbook file and read its installments
    async fn import_file(&self, path: PathBuf) -> Result<Vec<DebtRecord>, ImportError>;
}

#[async_trait]
impl DebtImporterTrait for SpreadsheetDebtImporter {
    fn parse(&self, workbook: &dyn Workbook) -> Vec<DebtRecord> {
        SpreadsheetDebtImporter::parse(self, workbook)
    }

    async fn import_file(&self, path: PathBuf) -> Result<Vec<DebtRecord>, ImportError> {
        let importer = self.clone();
        tokio::task::spawn_blocking(move || {
            let workbook = XlsxWorkbook::open(&path)?;
            Ok::<_, ImportError>(importer.parse(&workbook))
        })
        .await
        .map_err(|e| ImportError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_import_missing_file() {
        let importer: ImporterRef = Arc::new(SpreadsheetDebtImporter::default());
        let err = importer
            .import_file(PathBuf::from("/nonexistent/debts.xlsx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::NotFound { .. }));
    }

    #[test]
    fn test_trait_object_parse() {
        let importer: ImporterRef = Arc::new(SpreadsheetDebtImporter::default());
        let records = importer.parse(&GridWorkbook::default());
        assert_eq!(records, fallback_records());
    }
}
