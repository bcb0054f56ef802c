//! `.xlsx` workbook decoding
//!
//! Values come from calamine (0-based positions); fill colours come from
//! edit-xlsx (1-based positions). Both are merged into a `GridWorkbook`.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use edit_xlsx::Read;
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::ImportError;
use crate::workbook::{Cell, CellFill, CellValue, GridSheet, GridWorkbook, Sheet, Workbook};

/// Workbook decoded from an `.xlsx` file
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    grid: GridWorkbook,
}

impl XlsxWorkbook {
    /// Decode every sheet of the file at `path`
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::NotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let mut values: Xlsx<BufReader<File>> = open_workbook(path).map_err(|e| ImportError::Unreadable {
            path: path.to_string_lossy().to_string(),
            message: format!("{}", e),
        })?;

        // Without fills every installment reads as pending, which is still usable.
        let styles = match edit_xlsx::Workbook::from_path(path) {
            Ok(book) => Some(book),
            Err(e) => {
                warn!("Cannot read fill colours of {}: {}", path.display(), e);
                None
            }
        };

        let mut grid = GridWorkbook::default();
        for name in values.sheet_names().to_vec() {
            let range = values.worksheet_range(&name).map_err(|e| ImportError::SheetError {
                sheet: name.clone(),
                message: e.to_string(),
            })?;

            let style_sheet = styles
                .as_ref()
                .and_then(|book| book.get_worksheet_by_name(&name).ok());

            let mut sheet = GridSheet::new(name.as_str());
            let (top, left) = range.start().unwrap_or((0, 0));
            for (r, c, data) in range.cells() {
                let value = cell_value(data);
                if value == CellValue::Empty {
                    continue;
                }
                let row = top + r as u32 + 1;
                let col = left + c as u32 + 1;

                let fill = style_sheet.and_then(|s| {
                    let cell = s.read_cell((row, col)).ok()?;
                    cell.format.as_ref().and_then(cell_fill)
                });

                sheet.set(row, col, Cell { value, fill });
            }

            debug!(
                "Decoded sheet '{}': {} rows x {} columns",
                name,
                sheet.row_count(),
                sheet.column_count()
            );
            grid.push(sheet);
        }

        Ok(Self { grid })
    }

}

impl Workbook for XlsxWorkbook {
    fn sheets(&self) -> Vec<&dyn Sheet> {
        self.grid.sheets()
    }
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64()) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match iso_to_datetime(s) {
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Excel serial day number to a UTC timestamp
///
/// Day 0 is 1899-12-30, which absorbs the 1900 leap-year quirk for every
/// date after February 1900.
pub fn serial_to_datetime(serial: f64) -> Option<DateTime<FixedOffset>> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    let naive = epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))?;
    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

fn iso_to_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))?;
    Some(Utc.from_utc_datetime(&naive).fixed_offset())
}

/// Pattern fill colours of a cell format, if either is an explicit RGB colour
fn cell_fill(format: &edit_xlsx::Format) -> Option<CellFill> {
    let foreground = rgb_code(&format.fill.fg_color);
    let background = rgb_code(&format.fill.bg_color);
    if foreground.is_none() && background.is_none() {
        return None;
    }
    Some(CellFill { foreground, background })
}

/// `AARRGGBB` code of an explicit RGB colour; theme and indexed colours are not resolved
fn rgb_code(color: &edit_xlsx::FormatColor) -> Option<String> {
    match color {
        edit_xlsx::FormatColor::RGB(r, g, b) => Some(format!("FF{:02X}{:02X}{:02X}", r, g, b)),
        edit_xlsx::FormatColor::Default
        | edit_xlsx::FormatColor::Index(_)
        | edit_xlsx::FormatColor::Theme(_, _) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebtStatus, SpreadsheetDebtImporter};
    use rust_decimal::Decimal;

    #[test]
    fn test_serial_dates() {
        let dt = serial_to_datetime(45812.0).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert_eq!(dt.offset().local_minus_utc(), 0);

        let noon = serial_to_datetime(45910.5).unwrap();
        assert_eq!(noon.to_rfc3339(), "2025-09-10T12:00:00+00:00");

        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_iso_values() {
        let dt = iso_to_datetime("2025-06-04T00:00:00").unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 4).unwrap());
        assert!(iso_to_datetime("2025-06-04").is_some());
        assert!(iso_to_datetime("junio").is_none());
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Int(5)), CellValue::Number(5.0));
        assert_eq!(cell_value(&Data::String("ICBC".into())), CellValue::from("ICBC"));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_cell_fill_reads_both_pattern_colours() {
        let mut format = edit_xlsx::Format::default();
        format.fill.fg_color = edit_xlsx::FormatColor::Theme(4, 0.0);
        format.fill.bg_color = edit_xlsx::FormatColor::RGB(0, 176, 80);
        let fill = cell_fill(&format).unwrap();
        assert_eq!(fill.foreground, None);
        assert_eq!(fill.code(), Some("FF00B050"));

        let format = edit_xlsx::Format::default().set_background_color(edit_xlsx::FormatColor::RGB(146, 208, 80));
        assert_eq!(cell_fill(&format).unwrap().code(), Some("FF92D050"));

        assert!(cell_fill(&edit_xlsx::Format::default()).is_none());
    }

    #[test]
    fn test_open_reads_values_and_fills() {
        use edit_xlsx::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ExcelDeudas.xlsx");

        let mut book = edit_xlsx::Workbook::new();
        let sheet = book.add_worksheet_by_name("Deudas").unwrap();
        let green = edit_xlsx::Format::default().set_background_color(edit_xlsx::FormatColor::RGB(0, 176, 80));
        sheet.write("A1", "ICBC").unwrap();
        sheet.write("A2", "TARJETA VISA").unwrap();
        sheet.write("A3", "FECHA").unwrap();
        sheet.write("B3", "MONTO").unwrap();
        sheet.write("A4", "4/6/2025").unwrap();
        sheet.write_with_format("B4", 33026.21, &green).unwrap();
        sheet.write("A5", "4/7/2025").unwrap();
        sheet.write("B5", 100).unwrap();
        book.save_as(&path).unwrap();

        let workbook = XlsxWorkbook::open(&path).unwrap();
        let records = SpreadsheetDebtImporter::default().parse(&workbook);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "ICBC-1");
        assert_eq!(records[0].loan_name, "TARJETA VISA");
        assert_eq!(records[0].amount, Decimal::new(3302621, 2));
        assert_eq!(records[0].status, DebtStatus::Paid);
        assert_eq!(records[1].id, "ICBC-2");
        assert_eq!(records[1].amount, Decimal::from(100));
        assert_eq!(records[1].status, DebtStatus::Pending);
    }

    #[test]
    fn test_missing_file() {
        let err = XlsxWorkbook::open(Path::new("/nonexistent/ExcelDeudas.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::NotFound { .. }));
    }
}
