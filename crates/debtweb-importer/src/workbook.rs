//! Workbook abstraction consumed by the importer
//!
//! Rows and columns are 1-indexed, matching how the spreadsheet is read by
//! a person. Decoding a concrete file format lives in `adapters`.

use chrono::{DateTime, FixedOffset};

/// Scalar cell content
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(DateTime<FixedOffset>),
}

impl CellValue {
    /// Whether the cell carries something usable (zero, `false` and blank text do not)
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Bool(b) => *b,
            CellValue::DateTime(_) => true,
        }
    }

    /// Text rendering of the value
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.to_rfc3339(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<DateTime<FixedOffset>> for CellValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        CellValue::DateTime(dt)
    }
}

/// Fill colours of a cell, as ARGB or RGB hex codes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellFill {
    pub foreground: Option<String>,
    pub background: Option<String>,
}

impl CellFill {
    pub fn solid(code: impl Into<String>) -> Self {
        Self {
            foreground: Some(code.into()),
            background: None,
        }
    }

    /// The colour that decides the status: foreground first, then background
    pub fn code(&self) -> Option<&str> {
        self.foreground
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.background.as_deref().filter(|c| !c.is_empty()))
    }
}

/// A cell's value together with its fill
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub fill: Option<CellFill>,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            fill: None,
        }
    }

    pub fn filled(value: impl Into<CellValue>, code: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            fill: Some(CellFill::solid(code)),
        }
    }

    /// Trimmed, uppercased text of the value
    pub fn label(&self) -> String {
        self.value.as_text().trim().to_uppercase()
    }
}

/// A single sheet of a workbook
pub trait Sheet {
    fn name(&self) -> &str;

    /// Index of the last row holding data
    fn row_count(&self) -> u32;

    /// Index of the last column holding data
    fn column_count(&self) -> u32;

    /// Cell at `(row, column)`; out-of-range positions read as empty
    fn cell(&self, row: u32, column: u32) -> Cell;
}

/// An opened workbook
pub trait Workbook {
    fn sheets(&self) -> Vec<&dyn Sheet>;
}

/// In-memory sheet stored row by row
#[derive(Debug, Clone, Default)]
pub struct GridSheet {
    name: String,
    rows: Vec<Vec<Cell>>,
}

impl GridSheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Store a cell, growing the grid as needed
    pub fn set(&mut self, row: u32, column: u32, cell: Cell) {
        if row == 0 || column == 0 {
            return;
        }
        let (r, c) = (row as usize - 1, column as usize - 1);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let line = &mut self.rows[r];
        if line.len() <= c {
            line.resize_with(c + 1, Cell::default);
        }
        line[c] = cell;
    }

    /// Builder form of [`GridSheet::set`]
    pub fn with(mut self, row: u32, column: u32, cell: Cell) -> Self {
        self.set(row, column, cell);
        self
    }
}

impl Sheet for GridSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    fn column_count(&self) -> u32 {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32
    }

    fn cell(&self, row: u32, column: u32) -> Cell {
        if row == 0 || column == 0 {
            return Cell::default();
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(column as usize - 1))
            .cloned()
            .unwrap_or_default()
    }
}

/// In-memory workbook
#[derive(Debug, Clone, Default)]
pub struct GridWorkbook {
    sheets: Vec<GridSheet>,
}

impl GridWorkbook {
    pub fn new(sheets: Vec<GridSheet>) -> Self {
        Self { sheets }
    }

    pub fn push(&mut self, sheet: GridSheet) {
        self.sheets.push(sheet);
    }
}

impl Workbook for GridWorkbook {
    fn sheets(&self) -> Vec<&dyn Sheet> {
        self.sheets.iter().map(|s| s as &dyn Sheet).collect()
    }
}
