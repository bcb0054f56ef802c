//! Decoders from concrete file formats into the workbook abstraction

pub mod xlsx;

pub use xlsx::XlsxWorkbook;
