use core::fmt;

use serde::{Deserialize, Serialize};

use crate::address::CellRef;

/// How bad a parse-time observation is.
///
/// Nothing here aborts a parse; fatal conditions are modeled as errors in the
/// ingestion crate. `Error` marks conditions that degrade results broadly
/// (e.g. a missing semester start date zeroing out hour attribution), while
/// `Warning` covers single records that were defaulted or skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

/// One parse-time observation, collected alongside the snapshot instead of
/// being interleaved through a global logger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Display name of the sheet the observation is about.
    pub sheet: String,
    /// Cell coordinates when the observation is about a specific cell.
    pub cell: Option<CellRef>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            sheet: sheet.into(),
            cell: None,
            message: message.into(),
        }
    }

    pub fn error(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            sheet: sheet.into(),
            cell: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, cell: CellRef) -> Self {
        self.cell = Some(cell);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match self.cell {
            Some(cell) => write!(f, "{sev} [{}!{}]: {}", self.sheet, cell, self.message),
            None => write!(f, "{sev} [{}]: {}", self.sheet, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_sheet_and_cell_context() {
        let d = Diagnostic::warning("Subjects", "bad color").at(CellRef::new(1, 19));
        assert_eq!(d.to_string(), "warning [Subjects!T2]: bad color");

        let d = Diagnostic::error("Information", "semester 1 start missing");
        assert_eq!(
            d.to_string(),
            "error [Information]: semester 1 start missing"
        );
    }
}
