//! Built-in records returned when a workbook yields nothing

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{DebtRecord, DebtStatus, InstallmentDate};

fn sample(
    id: &str,
    entity: &str,
    loan: &str,
    cents: i64,
    (y, m, d): (i32, u32, u32),
    status: DebtStatus,
) -> DebtRecord {
    let date = match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => InstallmentDate::Calendar(date),
        None => InstallmentDate::Raw(format!("{}-{:02}-{:02}", y, m, d)),
    };
    DebtRecord {
        id: id.to_string(),
        entity: entity.to_string(),
        loan_name: loan.to_string(),
        date,
        amount: Decimal::new(cents, 2),
        status,
    }
}

/// The fixed placeholder set, identical on every call
pub fn fallback_records() -> Vec<DebtRecord> {
    use DebtStatus::{Paid, Pending};

    vec![
        sample("GAL-1", "GALICIA", "PRESTAMO 1", 7501765, (2025, 9, 10), Pending),
        sample("GAL-2", "GALICIA", "PRESTAMO 2", 5200000, (2025, 10, 15), Paid),
        sample("UAL-1", "UALA", "PRESTAMO 1", 6596275, (2025, 4, 7), Pending),
        sample("UAL-2", "UALA", "PRESTAMO 2", 8787668, (2025, 5, 15), Paid),
        sample("MP-1", "MERCADO PAGO", "PRESTAMO 1", 3948300, (2025, 10, 13), Pending),
        sample("MP-2", "MERCADO PAGO", "PRESTAMO 2", 16443333, (2025, 10, 13), Paid),
        sample("ICBC-1", "ICBC", "PRESTAMO 1", 3302621, (2025, 6, 4), Pending),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_stable() {
        let records = fallback_records();
        assert_eq!(records.len(), 7);
        assert_eq!(records, fallback_records());

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["GAL-1", "GAL-2", "UAL-1", "UAL-2", "MP-1", "MP-2", "ICBC-1"]);
        assert!(records.iter().all(|r| r.date.calendar().is_some()));
        assert!(records.iter().any(|r| r.status == DebtStatus::Paid));
    }
}
