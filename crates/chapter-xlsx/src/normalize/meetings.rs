//! Meeting schedule from the MeetingInfo sheet.
//!
//! Rows from row 4: title (B), date (C), start time (D), end time (E),
//! length (F), notes (G). Dates keep both the typed value and a long-form
//! label for display; times normalize to `h:mm AM/PM`.

use chapter_model::{format_date_long, CellRef, Diagnostic, Meeting};

use crate::container::WorkbookGrids;
use crate::datetime::{coerce_date, format_time};
use crate::normalize::{optional_sheet, SheetSlot, Sink};

const SLOT: SheetSlot = SheetSlot::MeetingInfo;
const ROWS_FROM: u32 = 3;

const DEFAULT_LENGTH: &str = "N/A";
const DEFAULT_NOTES: &str = "No notes for this meeting.";

pub(crate) fn extract(grids: &WorkbookGrids, sink: &mut Sink) -> Vec<Meeting> {
    let Some(sheet) = optional_sheet(grids, SLOT, "no meetings will be available", sink) else {
        return Vec::new();
    };

    if sheet.row_count() <= ROWS_FROM {
        sink.push(Diagnostic::warning(
            SLOT.display_name(),
            format!(
                "no meeting rows from row {} down; no meetings will be available",
                ROWS_FROM + 1
            ),
        ));
        return Vec::new();
    }

    let mut meetings = Vec::new();
    for row in ROWS_FROM..sheet.row_count() {
        let title = sheet.cell(row, 1).text();
        if title.is_empty() {
            continue;
        }

        let date_cell = sheet.cell(row, 2);
        let date = coerce_date(date_cell, grids.date_system);
        let date_label = match date {
            Some(d) => format_date_long(d),
            None => {
                if !date_cell.is_blank() {
                    sink.push(
                        Diagnostic::warning(
                            SLOT.display_name(),
                            format!(
                                "invalid date {:?} for meeting {title:?}",
                                date_cell.text()
                            ),
                        )
                        .at(CellRef::new(row, 2)),
                    );
                }
                "Invalid Date".to_owned()
            }
        };

        let meeting = Meeting {
            id: format!("meeting-{row}"),
            title: title.into_owned(),
            date,
            date_label,
            start_time: time_label(grids, row, 3, sink),
            end_time: time_label(grids, row, 4, sink),
            length: text_or(sheet.cell(row, 5).text().as_ref(), DEFAULT_LENGTH),
            notes: text_or(sheet.cell(row, 6).text().as_ref(), DEFAULT_NOTES),
        };
        meetings.push(meeting);
    }

    meetings
}

fn text_or(raw: &str, default: &str) -> String {
    if raw.is_empty() {
        default.to_owned()
    } else {
        raw.to_owned()
    }
}

/// Time cell to `h:mm AM/PM`, falling back to "N/A" with a warning when a
/// non-blank cell cannot be read as a time.
fn time_label(grids: &WorkbookGrids, row: u32, col: u32, sink: &mut Sink) -> String {
    let sheet = &grids.sheets[SLOT.position()];
    let cell = sheet.cell(row, col);
    match format_time(cell) {
        Some(label) => label,
        None => {
            if !cell.is_blank() {
                sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!("unreadable time value {:?}", cell.text()),
                    )
                    .at(CellRef::new(row, col)),
                );
            }
            "N/A".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapter_model::{CellScalar, SheetGrid};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellScalar {
        CellScalar::Text(s.into())
    }

    fn grids(sheet: SheetGrid) -> WorkbookGrids {
        let mut sheets: Vec<SheetGrid> =
            (0..7).map(|i| SheetGrid::new(format!("S{i}"))).collect();
        sheets.push(sheet);
        WorkbookGrids {
            sheets,
            date_system: Default::default(),
        }
    }

    #[test]
    fn meeting_fields_fill_with_defaults() {
        let mut sheet = SheetGrid::new("MeetingInfo");
        sheet.set(CellRef::new(ROWS_FROM, 1), text("General Meeting"));
        // Serial for 2025-08-20 in the 1900 system.
        sheet.set(CellRef::new(ROWS_FROM, 2), CellScalar::Number(45889.0));
        sheet.set(CellRef::new(ROWS_FROM, 3), CellScalar::Number(0.3125));
        sheet.set(CellRef::new(ROWS_FROM, 4), text("8:15am"));

        let mut sink = Sink::default();
        let meetings = extract(&grids(sheet), &mut sink);

        assert_eq!(meetings.len(), 1);
        let m = &meetings[0];
        assert_eq!(m.date, NaiveDate::from_ymd_opt(2025, 8, 20));
        assert_eq!(m.date_label, "20 August 2025");
        assert_eq!(m.start_time, "7:30 AM");
        assert_eq!(m.end_time, "8:15 AM");
        assert_eq!(m.length, DEFAULT_LENGTH);
        assert_eq!(m.notes, DEFAULT_NOTES);
        assert!(sink.items.is_empty());
    }

    #[test]
    fn bad_date_and_time_cells_warn() {
        let mut sheet = SheetGrid::new("MeetingInfo");
        sheet.set(CellRef::new(ROWS_FROM, 1), text("Workshop"));
        sheet.set(CellRef::new(ROWS_FROM, 2), text("someday"));
        // A whole-day number is not a clock time.
        sheet.set(CellRef::new(ROWS_FROM, 3), CellScalar::Number(1.5));
        sheet.set(CellRef::new(ROWS_FROM, 4), text("after lunch"));

        let mut sink = Sink::default();
        let meetings = extract(&grids(sheet), &mut sink);

        let m = &meetings[0];
        assert_eq!(m.date, None);
        assert_eq!(m.date_label, "Invalid Date");
        assert_eq!(m.start_time, "N/A");
        // Free-form text is kept as the author wrote it.
        assert_eq!(m.end_time, "after lunch");
        assert_eq!(sink.items.len(), 2);
    }

    #[test]
    fn empty_sheet_degrades_with_a_warning() {
        let sheet = SheetGrid::new("MeetingInfo");
        let mut sink = Sink::default();
        assert!(extract(&grids(sheet), &mut sink).is_empty());
        assert_eq!(sink.items.len(), 1);
    }
}
