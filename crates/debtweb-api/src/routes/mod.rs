//! Route modules for the API server
//!
//! - debts: debt list, workbook import, status overrides
//! - settings: effective configuration
//!
//! Each module keeps its handlers in `api.rs` and re-exports them from `mod.rs`.

pub mod debts;
pub mod settings;
