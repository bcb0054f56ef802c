//! Row scanner that turns a debt workbook into installment records
//!
//! The workbook has no declared schema. Each creditor section starts with a
//! row whose first cell is the creditor name; inside it, every loan table
//! starts with a header row holding the date label, the row just above it
//! carries the loan titles, and each loan occupies a (date, amount) column
//! pair. A green fill on the amount cell marks the installment as paid.

use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::normalize::{amount_from_cell, date_from_cell};
use crate::samples::fallback_records;
use crate::status::{FillTable, PAID_FILLS};
use crate::types::{DebtRecord, DebtStatus, InstallmentDate};
use crate::workbook::{CellValue, Sheet, Workbook};

/// Entity used for rows scanned before any creditor header
pub const DEFAULT_ENTITY: &str = "General";

/// Title used when both cells above a loan column pair are empty
pub const LOAN_PLACEHOLDER: &str = "Préstamo";

/// What the scanner looks for
#[derive(Debug, Clone)]
pub struct ImportRules {
    /// Known creditor names, uppercased
    pub entities: Vec<String>,
    /// Label of the due-date column, uppercased
    pub date_header: String,
    /// Marker of advance-payment rows, uppercased
    pub exclusion_marker: String,
    pub fills: FillTable,
}

impl Default for ImportRules {
    fn default() -> Self {
        Self::new(
            ["GALICIA", "UALA", "MERCADO PAGO", "ICBC"],
            "FECHA",
            "PAGOANTICIPADO",
            PAID_FILLS.iter().copied(),
        )
    }
}

impl ImportRules {
    pub fn new<E, S, F, C>(entities: E, date_header: &str, exclusion_marker: &str, paid_fills: F) -> Self
    where
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self {
            entities: entities
                .into_iter()
                .map(|e| e.as_ref().trim().to_uppercase())
                .filter(|e| !e.is_empty())
                .collect(),
            date_header: date_header.trim().to_uppercase(),
            exclusion_marker: exclusion_marker.trim().to_uppercase(),
            fills: FillTable::new(paid_fills),
        }
    }

    fn is_entity(&self, label: &str) -> bool {
        self.entities.iter().any(|e| e == label)
    }
}

/// Where the scanner stands within a sheet
#[derive(Debug, Clone, PartialEq)]
enum Section {
    /// No loan table open yet in the current creditor section
    Outside,
    /// Inside a loan table; one title per (date, amount) column pair
    Table { loans: Vec<String> },
}

/// Records accumulated over one parse call
#[derive(Debug)]
struct ImportRun {
    next_seq: u32,
    records: Vec<DebtRecord>,
}

impl ImportRun {
    fn new() -> Self {
        Self {
            next_seq: 1,
            records: Vec::new(),
        }
    }

    fn emit(&mut self, entity: &str, loan_name: &str, date: InstallmentDate, amount: Decimal, status: DebtStatus) {
        self.records.push(DebtRecord {
            id: format!("{}-{}", entity, self.next_seq),
            entity: entity.to_string(),
            loan_name: loan_name.to_string(),
            date,
            amount,
            status,
        });
        self.next_seq += 1;
    }
}

/// Positional importer for hand-maintained debt workbooks
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetDebtImporter {
    rules: ImportRules,
}

impl SpreadsheetDebtImporter {
    pub fn new(rules: ImportRules) -> Self {
        Self { rules }
    }

    /// Read every sheet and return the installments sorted by due date
    ///
    /// Never fails: unreadable cells are skipped, and a workbook without a
    /// single qualifying installment yields the built-in sample set.
    pub fn parse(&self, workbook: &dyn Workbook) -> Vec<DebtRecord> {
        let mut run = ImportRun::new();

        for sheet in workbook.sheets() {
            self.scan_sheet(sheet, &mut run);
        }

        self.finish(run.records)
    }

    fn scan_sheet(&self, sheet: &dyn Sheet, run: &mut ImportRun) {
        let mut entity = DEFAULT_ENTITY.to_string();
        let mut section = Section::Outside;
        let mut sections = 0usize;
        let mut tables = 0usize;
        let emitted_before = run.records.len();

        for row in 1..=sheet.row_count() {
            let first = sheet.cell(row, 1).label();

            if self.rules.is_entity(&first) {
                debug!("Sheet '{}' row {}: section {}", sheet.name(), row, first);
                entity = first;
                section = Section::Outside;
                sections += 1;
                continue;
            }

            if self.is_header_row(sheet, row) {
                let loans = loan_names(sheet, row);
                debug!(
                    "Sheet '{}' row {}: loan table for {} with {:?}",
                    sheet.name(),
                    row,
                    entity,
                    loans
                );
                section = Section::Table { loans };
                tables += 1;
                continue;
            }

            if let Section::Table { loans } = &section {
                for (i, loan) in loans.iter().enumerate() {
                    let date_col = 2 * i as u32 + 1;
                    if let Some((date, amount, status)) = self.read_pair(sheet, row, date_col) {
                        run.emit(&entity, loan, date, amount, status);
                    }
                }

                if self.looks_like_section_title(sheet, row) {
                    debug!(
                        "Sheet '{}' row {}: '{}' is not a known entity, rows stay under {}",
                        sheet.name(),
                        row,
                        first,
                        entity
                    );
                }
            }
        }

        info!(
            "Sheet '{}': {} sections, {} loan tables, {} installments",
            sheet.name(),
            sections,
            tables,
            run.records.len() - emitted_before
        );
    }

    /// Header cells must match the date label exactly; only case is ignored
    fn is_header_row(&self, sheet: &dyn Sheet, row: u32) -> bool {
        (1..=sheet.column_count())
            .any(|col| sheet.cell(row, col).value.as_text().to_uppercase() == self.rules.date_header)
    }

    /// A lone text cell in column 1 that is not followed by a loan header
    fn looks_like_section_title(&self, sheet: &dyn Sheet, row: u32) -> bool {
        let first = sheet.cell(row, 1).value;
        let is_title = matches!(&first, CellValue::Text(s) if !s.trim().is_empty()
            && !s.chars().any(|c| c.is_ascii_digit()));
        is_title
            && (2..=sheet.column_count()).all(|col| !sheet.cell(row, col).value.is_present())
            && !self.is_header_row(sheet, row + 1)
    }

    /// Date, amount and status of one loan's column pair, if the pair qualifies
    fn read_pair(&self, sheet: &dyn Sheet, row: u32, date_col: u32) -> Option<(InstallmentDate, Decimal, DebtStatus)> {
        let date_cell = sheet.cell(row, date_col);
        let amount_cell = sheet.cell(row, date_col + 1);

        if !date_cell.value.is_present() || !amount_cell.value.is_present() {
            return None;
        }

        let amount = amount_from_cell(&amount_cell.value)?;
        if amount <= Decimal::ZERO {
            return None;
        }

        let date = date_from_cell(&date_cell.value)?;
        let color = amount_cell.fill.as_ref().and_then(|f| f.code());
        let status = self.rules.fills.status_for(color);

        Some((date, amount, status))
    }

    fn finish(&self, mut records: Vec<DebtRecord>) -> Vec<DebtRecord> {
        let marker = &self.rules.exclusion_marker;
        if !marker.is_empty() {
            let before = records.len();
            records.retain(|r| !r.mentions(marker));
            let excluded = before - records.len();
            if excluded > 0 {
                info!("Excluded {} advance-payment installments", excluded);
            }
        }

        records.sort_by(|a, b| a.date.chronological_cmp(&b.date));

        if records.is_empty() {
            warn!("No installments found in workbook, using sample data");
            return fallback_records();
        }

        info!("Imported {} installments", records.len());
        records
    }
}

/// Loan titles from the row above a header, one per column pair
fn loan_names(sheet: &dyn Sheet, header_row: u32) -> Vec<String> {
    let title_row = header_row.saturating_sub(1);

    (1..=sheet.column_count())
        .step_by(2)
        .map(|col| {
            [col, col + 1]
                .iter()
                .map(|&c| sheet.cell(title_row, c).value)
                .filter(CellValue::is_present)
                .map(|v| v.as_text().trim().to_string())
                .find(|t| !t.is_empty())
                .unwrap_or_else(|| LOAN_PLACEHOLDER.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{Cell, GridSheet, GridWorkbook};
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
    use std::str::FromStr;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().fixed_offset()
    }

    fn day(y: i32, m: u32, d: u32) -> InstallmentDate {
        InstallmentDate::Calendar(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn parse(sheets: Vec<GridSheet>) -> Vec<DebtRecord> {
        SpreadsheetDebtImporter::default().parse(&GridWorkbook::new(sheets))
    }

    fn icbc_sheet() -> GridSheet {
        GridSheet::new("Deudas")
            .with(1, 1, Cell::new("ICBC"))
            .with(2, 1, Cell::new("TARJETA VISA"))
            .with(3, 1, Cell::new("FECHA"))
            .with(3, 2, Cell::new("MONTO"))
            .with(4, 1, Cell::new(utc(2025, 6, 4)))
            .with(4, 2, Cell::filled(33026.21, "FF00B050"))
    }

    #[test]
    fn test_icbc_scenario() {
        let records = parse(vec![icbc_sheet()]);
        assert_eq!(
            records,
            vec![DebtRecord {
                id: "ICBC-1".to_string(),
                entity: "ICBC".to_string(),
                loan_name: "TARJETA VISA".to_string(),
                date: day(2025, 6, 4),
                amount: Decimal::from_str("33026.21").unwrap(),
                status: DebtStatus::Paid,
            }]
        );
    }

    #[test]
    fn test_unrecognisable_input_yields_samples() {
        let sheet = GridSheet::new("Hoja1")
            .with(1, 1, Cell::new("Gastos del mes"))
            .with(2, 1, Cell::new(utc(2025, 1, 1)))
            .with(2, 2, Cell::new(100.0));
        assert_eq!(parse(vec![sheet]), fallback_records());
        assert_eq!(parse(Vec::new()), fallback_records());
    }

    #[test]
    fn test_two_loans_side_by_side() {
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("galicia "))
            .with(2, 1, Cell::new("PRESTAMO AUTO"))
            .with(2, 4, Cell::new("PERSONAL"))
            .with(3, 1, Cell::new("Fecha"))
            .with(3, 2, Cell::new("Monto"))
            .with(3, 3, Cell::new("FECHA"))
            .with(3, 4, Cell::new("MONTO"))
            .with(4, 1, Cell::new("10/9/2025"))
            .with(4, 2, Cell::new("75.017,65"))
            .with(4, 3, Cell::new("15/10/2025"))
            .with(4, 4, Cell::filled(52000.0, "FF92D050"));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "GALICIA-1");
        assert_eq!(records[0].loan_name, "PRESTAMO AUTO");
        assert_eq!(records[0].date, day(2025, 9, 10));
        assert_eq!(records[0].amount, Decimal::from_str("75017.65").unwrap());
        assert_eq!(records[0].status, DebtStatus::Pending);

        assert_eq!(records[1].id, "GALICIA-2");
        assert_eq!(records[1].loan_name, "PERSONAL");
        assert_eq!(records[1].status, DebtStatus::Paid);
    }

    #[test]
    fn test_non_positive_and_non_numeric_amounts_are_skipped() {
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("UALA"))
            .with(2, 1, Cell::new("PRESTAMO"))
            .with(3, 1, Cell::new("FECHA"))
            .with(4, 1, Cell::new(utc(2025, 4, 7)))
            .with(4, 2, Cell::new(-10.0))
            .with(5, 1, Cell::new(utc(2025, 5, 7)))
            .with(5, 2, Cell::new("0,00"))
            .with(6, 1, Cell::new(utc(2025, 6, 7)))
            .with(6, 2, Cell::new("pagado"))
            .with(7, 1, Cell::new(utc(2025, 7, 7)))
            .with(7, 2, Cell::new("65.962,75"));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| r.amount > Decimal::ZERO));
        assert_eq!(records[0].id, "UALA-1");
        assert_eq!(records[0].date, day(2025, 7, 7));
    }

    #[test]
    fn test_output_sorted_with_raw_dates_last() {
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("ICBC"))
            .with(2, 1, Cell::new("VISA"))
            .with(3, 1, Cell::new("FECHA"))
            .with(4, 1, Cell::new("a confirmar"))
            .with(4, 2, Cell::new(10.0))
            .with(5, 1, Cell::new(utc(2025, 12, 1)))
            .with(5, 2, Cell::new(20.0))
            .with(6, 1, Cell::new(utc(2025, 3, 1)))
            .with(6, 2, Cell::new(30.0));

        let records = parse(vec![sheet]);
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2025-03-01", "2025-12-01", "a confirmar"]);
    }

    #[test]
    fn test_advance_payment_rows_are_excluded() {
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("MERCADO PAGO"))
            .with(2, 1, Cell::new("Credito"))
            .with(2, 3, Cell::new("PagoAnticipado"))
            .with(3, 1, Cell::new("FECHA"))
            .with(3, 3, Cell::new("FECHA"))
            .with(4, 1, Cell::new("pagoanticipado"))
            .with(4, 2, Cell::new(500.0))
            .with(4, 3, Cell::new(utc(2025, 10, 13)))
            .with(4, 4, Cell::new(700.0))
            .with(5, 1, Cell::new(utc(2025, 10, 13)))
            .with(5, 2, Cell::new(39483.0));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| !r.mentions("PAGOANTICIPADO")));
        assert_eq!(records[0].loan_name, "Credito");
        // ids are assigned before filtering
        assert_eq!(records[0].id, "MERCADO PAGO-3");
    }

    #[test]
    fn test_sequence_is_shared_across_entities_and_sheets() {
        let second = GridSheet::new("Otra")
            .with(1, 1, Cell::new("UALA"))
            .with(2, 1, Cell::new("PRESTAMO"))
            .with(3, 1, Cell::new("FECHA"))
            .with(4, 1, Cell::new(utc(2025, 7, 1)))
            .with(4, 2, Cell::new(1.0));

        let records = parse(vec![icbc_sheet(), second]);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["ICBC-1", "UALA-2"]);

        let importer = SpreadsheetDebtImporter::default();
        let workbook = GridWorkbook::new(vec![icbc_sheet()]);
        assert_eq!(importer.parse(&workbook), importer.parse(&workbook));
    }

    #[test]
    fn test_gaps_do_not_close_the_table() {
        let sheet = icbc_sheet()
            .with(8, 1, Cell::new(utc(2025, 8, 4)))
            .with(8, 2, Cell::new(100.0));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].loan_name, "TARJETA VISA");
        assert_eq!(records[1].entity, "ICBC");
    }

    #[test]
    fn test_rows_before_any_entity_use_default() {
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("FECHA"))
            .with(2, 1, Cell::new(utc(2025, 2, 1)))
            .with(2, 2, Cell::new(42.0));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, DEFAULT_ENTITY);
        assert_eq!(records[0].id, "General-1");
        assert_eq!(records[0].loan_name, LOAN_PLACEHOLDER);
    }

    #[test]
    fn test_entity_header_closes_table() {
        let sheet = icbc_sheet()
            .with(5, 1, Cell::new("UALA"))
            .with(6, 1, Cell::new(utc(2025, 9, 1)))
            .with(6, 2, Cell::new(10.0));

        let records = parse(vec![sheet]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, "ICBC");
    }

    #[test]
    fn test_header_label_ignores_case_but_not_padding() {
        let header = |label: &str| {
            GridSheet::new("Deudas")
                .with(1, 1, Cell::new("ICBC"))
                .with(2, 1, Cell::new("TARJETA VISA"))
                .with(3, 1, Cell::new(label))
                .with(4, 1, Cell::new(utc(2025, 6, 4)))
                .with(4, 2, Cell::new(50.0))
        };

        let records = parse(vec![header("fecha")]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "ICBC-1");

        assert_eq!(parse(vec![header("FECHA ")]), fallback_records());
    }

    #[test]
    fn test_custom_rules() {
        let rules = ImportRules::new(["naranja x"], "vto", "adelanto", ["C6EFCE"]);
        let sheet = GridSheet::new("Deudas")
            .with(1, 1, Cell::new("Naranja X"))
            .with(2, 1, Cell::new("TARJETA"))
            .with(3, 1, Cell::new("VTO"))
            .with(4, 1, Cell::new(utc(2025, 11, 5)))
            .with(4, 2, Cell::filled(1200.5, "FFC6EFCE"));

        let records = SpreadsheetDebtImporter::new(rules).parse(&GridWorkbook::new(vec![sheet]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity, "NARANJA X");
        assert_eq!(records[0].status, DebtStatus::Paid);
    }
}
