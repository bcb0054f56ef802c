//! Stored debt models

use debtweb_config::MergeMode;
use debtweb_importer::{DebtRecord, DebtStatus, InstallmentDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An installment as kept by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDebt {
    /// Persistent id, e.g. `debt-000001`
    pub id: String,
    /// Id assigned by the importer run that produced this debt
    pub source_id: String,
    pub entity: String,
    pub loan_name: String,
    pub date: InstallmentDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Status as imported; overrides are applied on read
    pub status: DebtStatus,
}

impl StoredDebt {
    pub fn from_record(id: String, record: DebtRecord) -> Self {
        Self {
            id,
            source_id: record.id,
            entity: record.entity,
            loan_name: record.loan_name,
            date: record.date,
            amount: record.amount,
            status: record.status,
        }
    }

    /// Identity of the installment regardless of ids and status
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.entity, &self.loan_name, &self.date, &self.amount)
    }
}

/// `entity|loan|date|amount`, with the amount in canonical form
pub fn fingerprint(entity: &str, loan_name: &str, date: &InstallmentDate, amount: &Decimal) -> String {
    format!(
        "{}|{}|{}|{}",
        entity.trim().to_uppercase(),
        loan_name.trim().to_uppercase(),
        date,
        amount.normalize()
    )
}

/// Fingerprint of a freshly imported record
pub fn record_fingerprint(record: &DebtRecord) -> String {
    fingerprint(&record.entity, &record.loan_name, &record.date, &record.amount)
}

/// Outcome of an import into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub mode: MergeMode,
    /// Records produced by the importer
    pub received: usize,
    /// Records added to the store
    pub added: usize,
    /// Records skipped as already stored
    pub duplicates: usize,
    /// Debts in the store after the import
    pub total: usize,
}

/// On-disk layout of the debts file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreFile {
    pub next_id: u64,
    #[serde(default)]
    pub debts: Vec<StoredDebt>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            next_id: 1,
            debts: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(amount: Decimal) -> DebtRecord {
        DebtRecord {
            id: "ICBC-1".to_string(),
            entity: "ICBC".to_string(),
            loan_name: "TARJETA VISA".to_string(),
            date: InstallmentDate::Calendar(NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()),
            amount,
            status: DebtStatus::Pending,
        }
    }

    #[test]
    fn test_fingerprint_ignores_scale_and_status() {
        let a = record(Decimal::new(3302621, 2));
        let mut b = record(Decimal::new(330262100, 4));
        b.status = DebtStatus::Paid;
        b.id = "ICBC-7".to_string();
        assert_eq!(record_fingerprint(&a), record_fingerprint(&b));
        assert_eq!(record_fingerprint(&a), "ICBC|TARJETA VISA|2025-06-04|33026.21");
    }

    #[test]
    fn test_stored_debt_keeps_source_id() {
        let debt = StoredDebt::from_record("debt-000001".to_string(), record(Decimal::new(100, 0)));
        assert_eq!(debt.source_id, "ICBC-1");
        assert_eq!(debt.fingerprint(), "ICBC|TARJETA VISA|2025-06-04|100");

        let json = serde_json::to_value(&debt).unwrap();
        assert_eq!(json["sourceId"], "ICBC-1");
        assert_eq!(json["amount"], serde_json::json!(100.0));
    }
}
