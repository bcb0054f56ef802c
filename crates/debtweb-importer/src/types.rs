//! Record types produced by the importer

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Payment status of an installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Pending,
    Paid,
}

impl Default for DebtStatus {
    fn default() -> Self {
        DebtStatus::Pending
    }
}

impl DebtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "pending",
            DebtStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for DebtStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(DebtStatus::Pending),
            "paid" => Ok(DebtStatus::Paid),
            _ => Err(format!("Invalid debt status: {}", s)),
        }
    }
}

impl std::fmt::Display for DebtStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Due date of an installment
///
/// Cells that could not be read as a calendar date keep their text so the
/// row is not lost; those sort after every real date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InstallmentDate {
    Calendar(NaiveDate),
    Raw(String),
}

impl InstallmentDate {
    pub fn calendar(&self) -> Option<NaiveDate> {
        match self {
            InstallmentDate::Calendar(d) => Some(*d),
            InstallmentDate::Raw(_) => None,
        }
    }

    /// Chronological order, raw dates last
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        match (self.calendar(), other.calendar()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for InstallmentDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallmentDate::Calendar(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            InstallmentDate::Raw(s) => write!(f, "{}", s),
        }
    }
}

impl From<InstallmentDate> for String {
    fn from(date: InstallmentDate) -> Self {
        date.to_string()
    }
}

impl From<String> for InstallmentDate {
    fn from(s: String) -> Self {
        match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => InstallmentDate::Calendar(d),
            Err(_) => InstallmentDate::Raw(s),
        }
    }
}

impl From<NaiveDate> for InstallmentDate {
    fn from(d: NaiveDate) -> Self {
        InstallmentDate::Calendar(d)
    }
}

/// One scheduled installment read from the workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRecord {
    /// `{entity}-{sequence}`, unique within one import
    pub id: String,
    /// Creditor the installment is owed to
    pub entity: String,
    /// Loan or card title within the creditor's section
    pub loan_name: String,
    /// Due date
    pub date: InstallmentDate,
    /// Installment amount, always positive
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: DebtStatus,
}

impl DebtRecord {
    /// Check whether the loan name or the date text carries the given marker
    pub fn mentions(&self, marker_upper: &str) -> bool {
        self.loan_name.to_uppercase().contains(marker_upper)
            || self.date.to_string().to_uppercase().contains(marker_upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_parsing() {
        assert_eq!(DebtStatus::from_str("PAID"), Ok(DebtStatus::Paid));
        assert_eq!(DebtStatus::from_str(" pending "), Ok(DebtStatus::Pending));
        assert!(DebtStatus::from_str("overdue").is_err());
    }

    #[test]
    fn test_raw_dates_sort_last() {
        let real = InstallmentDate::from("2025-01-01".to_string());
        let raw = InstallmentDate::from("sin fecha".to_string());
        assert_eq!(real.chronological_cmp(&raw), Ordering::Less);
        assert_eq!(raw.chronological_cmp(&real), Ordering::Greater);
    }

    #[test]
    fn test_record_json_shape() {
        let record = DebtRecord {
            id: "ICBC-1".to_string(),
            entity: "ICBC".to_string(),
            loan_name: "TARJETA VISA".to_string(),
            date: InstallmentDate::Calendar(NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()),
            amount: Decimal::new(3302621, 2),
            status: DebtStatus::Paid,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["loanName"], "TARJETA VISA");
        assert_eq!(json["date"], "2025-06-04");
        assert_eq!(json["amount"], serde_json::json!(33026.21));
        assert_eq!(json["status"], "paid");

        let back: DebtRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
