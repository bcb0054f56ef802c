//! Debt routes - list, import and status

pub mod api;

pub use api::{api_debt_detail, api_debts, api_import_debts, api_set_status};
