//! Amount and date normalization for hand-typed cells
//!
//! Amounts follow the es-AR convention: `.` groups thousands, `,` marks
//! decimals. Dates are either native date cells or `D/M/YYYY` text.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::InstallmentDate;
use crate::workbook::CellValue;

/// Shortest text (without `/`) still worth keeping as a date
const MIN_RAW_DATE_LEN: usize = 5;

/// Longest `[sign]digits[.digits]` prefix of `s`, if it holds at least one digit
fn leading_number(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let dot = end;
        end += 1;
        let mut fraction = 0;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            fraction += 1;
        }
        if fraction == 0 {
            end = dot;
        }
        digits += fraction;
    }
    (digits > 0).then(|| &s[..end])
}

/// Whether text reads as a number once the decimal comma is swapped for a point
pub fn is_numeric_text(text: &str) -> bool {
    let swapped = text.trim_start().replacen(',', ".", 1);
    leading_number(&swapped).is_some()
}

/// Parse a locale-formatted amount; anything unreadable is zero
pub fn parse_amount_text(text: &str) -> Decimal {
    let cleaned: String = text
        .replace('.', "")
        .replacen(',', ".", 1)
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    leading_number(&cleaned)
        .and_then(|n| Decimal::from_str(n.trim_start_matches('+')).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Convert a float cell to a decimal through its shortest round-trip text
pub fn decimal_from_f64(n: f64) -> Decimal {
    if !n.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&n.to_string()).unwrap_or(Decimal::ZERO)
}

/// Amount of a cell that qualifies as an amount, `None` otherwise
pub fn amount_from_cell(value: &CellValue) -> Option<Decimal> {
    match value {
        CellValue::Number(n) => Some(decimal_from_f64(*n)),
        CellValue::Text(s) if is_numeric_text(s) => Some(parse_amount_text(s)),
        _ => None,
    }
}

/// Calendar date of a timestamp, read in UTC
///
/// Date cells are stored as midnight UTC; reading them in a negative
/// offset would land on the previous day.
pub fn calendar_date_utc(dt: &DateTime<FixedOffset>) -> NaiveDate {
    dt.with_timezone(&Utc).date_naive()
}

/// Read a due date from text
pub fn date_from_text(text: &str) -> Option<InstallmentDate> {
    let text = text.trim();

    if text.contains('/') {
        let parts: Vec<&str> = text.split('/').map(str::trim).collect();
        if parts.len() != 3 {
            return Some(InstallmentDate::Raw(text.to_string()));
        }
        let (day, month, year) = (parts[0], parts[1], parts[2]);
        let assembled = format!("{}-{:0>2}-{:0>2}", year, month, day);

        let calendar = (year.len() == 4)
            .then(|| {
                let y = year.parse::<i32>().ok()?;
                let m = month.parse::<u32>().ok()?;
                let d = day.parse::<u32>().ok()?;
                NaiveDate::from_ymd_opt(y, m, d)
            })
            .flatten();

        return Some(match calendar {
            Some(d) => InstallmentDate::Calendar(d),
            None => InstallmentDate::Raw(assembled),
        });
    }

    if text.chars().count() < MIN_RAW_DATE_LEN {
        return None;
    }

    Some(match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(d) => InstallmentDate::Calendar(d),
        Err(_) => InstallmentDate::Raw(text.to_string()),
    })
}

/// Due date of a date cell, `None` when the cell cannot hold one
pub fn date_from_cell(value: &CellValue) -> Option<InstallmentDate> {
    match value {
        CellValue::Empty => None,
        CellValue::DateTime(dt) => Some(InstallmentDate::Calendar(calendar_date_utc(dt))),
        other => date_from_text(&other.as_text()),
    }
}
