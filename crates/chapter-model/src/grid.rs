use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::address::CellRef;

/// The value of one cell after workbook decode.
///
/// This is deliberately scalar-only: the ingestion layer resolves shared
/// strings, inline strings, and cached formula results before anything lands
/// in a grid, so the normalizer never sees file-format concerns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellScalar {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl CellScalar {
    /// True when the cell is empty or holds only whitespace text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellScalar::Empty => true,
            CellScalar::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed display text for the cell.
    ///
    /// Numbers render without a trailing `.0` when integral, which matches
    /// how the workbook authors see them in their spreadsheet UI.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            CellScalar::Empty => Cow::Borrowed(""),
            CellScalar::Text(s) => Cow::Borrowed(s.trim()),
            CellScalar::Bool(b) => Cow::Borrowed(if *b { "TRUE" } else { "FALSE" }),
            CellScalar::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Cow::Owned(format!("{}", *n as i64))
                } else {
                    Cow::Owned(n.to_string())
                }
            }
        }
    }

    /// Numeric view of the cell: native numbers pass through, text is parsed
    /// after trimming. Booleans and blanks are not numbers.
    pub fn number(&self) -> Option<f64> {
        match self {
            CellScalar::Number(n) => Some(*n),
            CellScalar::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

static EMPTY_CELL: CellScalar = CellScalar::Empty;

/// A dense, coordinate-addressable grid of one sheet's cell values.
///
/// Reads outside the populated area return [`CellScalar::Empty`] rather than
/// failing; the workbook is authored by hand and ragged rows are normal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    name: String,
    rows: Vec<Vec<CellScalar>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// The sheet's display name (informational; sheet identity is positional).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of populated rows (trailing empty rows are not materialized).
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// One row as a slice; rows past the populated area are empty.
    pub fn row(&self, row: u32) -> &[CellScalar] {
        self.rows.get(row as usize).map_or(&[], Vec::as_slice)
    }

    pub fn cell(&self, row: u32, col: u32) -> &CellScalar {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn at(&self, cell: CellRef) -> &CellScalar {
        self.cell(cell.row, cell.col)
    }

    /// Store a value, growing the grid as needed. Empty values are still
    /// stored so row counts reflect the sheet's used range.
    pub fn set(&mut self, cell: CellRef, value: CellScalar) {
        let row = cell.row as usize;
        let col = cell.col as usize;
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize_with(col + 1, CellScalar::default);
        }
        r[col] = value;
    }
}
