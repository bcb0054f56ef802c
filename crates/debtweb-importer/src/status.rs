//! Fill colour to payment status

use crate::types::DebtStatus;

/// Green fills the workbook uses to mark an installment as paid
///
/// Different spreadsheet tools write slightly different greens; each entry
/// is matched as a substring of the cell's ARGB/RGB code.
pub const PAID_FILLS: &[&str] = &["6AA84F", "34A853", "00B050", "92D050", "00FF00"];

/// Set of colour codes meaning "paid"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillTable {
    codes: Vec<String>,
}

impl Default for FillTable {
    fn default() -> Self {
        Self::new(PAID_FILLS.iter().copied())
    }
}

impl FillTable {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Status for a fill colour; no colour means pending
    pub fn status_for(&self, color: Option<&str>) -> DebtStatus {
        match color {
            Some(code) => status_for_color(code, &self.codes),
            None => DebtStatus::Pending,
        }
    }
}

/// Paid when `code` contains any of the `paid` codes
pub fn status_for_color<S: AsRef<str>>(code: &str, paid: &[S]) -> DebtStatus {
    let code = code.to_uppercase();
    if paid.iter().any(|p| code.contains(p.as_ref())) {
        DebtStatus::Paid
    } else {
        DebtStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_greens_are_paid() {
        let table = FillTable::default();
        for code in ["FF00B050", "FF92D050", "ff6aa84f", "34A853", "FF00FF00"] {
            assert_eq!(table.status_for(Some(code)), DebtStatus::Paid, "{}", code);
        }
    }

    #[test]
    fn test_other_fills_are_pending() {
        let table = FillTable::default();
        assert_eq!(table.status_for(Some("FFFFC000")), DebtStatus::Pending);
        assert_eq!(table.status_for(Some("FFFFFFFF")), DebtStatus::Pending);
        assert_eq!(table.status_for(None), DebtStatus::Pending);
    }

    #[test]
    fn test_custom_table() {
        let table = FillTable::new(["c6efce"]);
        assert_eq!(table.codes(), &["C6EFCE".to_string()]);
        assert_eq!(table.status_for(Some("FFC6EFCE")), DebtStatus::Paid);
        assert_eq!(table.status_for(Some("FF00B050")), DebtStatus::Pending);
    }
}
