//! XLSX ingestion for the chapter data workbook.
//!
//! The crate has two layers:
//!
//! - [`container`]: Open Packaging Convention (ZIP + SpreadsheetML) decode
//!   into dense per-sheet cell grids. Shared strings, inline strings, and
//!   cached formula values are resolved here, and the workbook's 1900/1904
//!   date system is captured.
//! - [`normalize`]: the single-pass ETL that turns the grids into a
//!   [`chapter_model::Snapshot`] plus collected diagnostics. Sheet identity
//!   is positional (the workbook is authored against a fixed sheet order),
//!   and only the primary hour sheet is load-bearing: everything else
//!   degrades section-by-section.
//!
//! Parsing is synchronous and not cancellable; callers fetch the workbook
//! bytes however they like and hand them to [`parse_workbook_bytes`].

pub mod container;
pub mod datetime;
pub mod normalize;

mod shared_strings;
mod sheet;

pub use container::{read_workbook_grids, WorkbookGrids, WorkbookReadError};
pub use datetime::DateSystem;
pub use normalize::{parse_workbook_bytes, parse_workbook_file, NormalizeError, ParseOutcome};
