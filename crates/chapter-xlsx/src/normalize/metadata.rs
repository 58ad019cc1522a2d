//! Information sheet (position 3): global metadata, semester boundaries,
//! and the homepage's dynamic lists.
//!
//! The essential cells are fixed: B1 website-last-updated, B2 hours-last-
//! updated, B3/B4/B5 the semester boundary dates. A missing semester-1
//! start is the one critical (but still non-fatal) condition in the whole
//! workbook: without it hour attribution is impossible and every member
//! degrades to zero hours.

use chrono::NaiveDate;

use chapter_model::{
    format_date_long, CellRef, CellScalar, ChangelogItem, Diagnostic, EventItem, LinkItem,
    UpdateItem,
};

use crate::container::WorkbookGrids;
use crate::datetime::{coerce_date, DateSystem};
use crate::normalize::{optional_sheet, SheetSlot, Sink};

/// Everything extracted from the Information sheet.
#[derive(Clone, Debug, Default)]
pub(crate) struct InfoSection {
    pub website_last_updated: Option<String>,
    pub hours_last_updated: Option<String>,
    pub semester1_start: Option<NaiveDate>,
    pub semester2_start: Option<NaiveDate>,
    pub semester2_end: Option<NaiveDate>,
    pub splash_texts: Vec<String>,
    pub upcoming_events: Vec<EventItem>,
    pub links: Vec<LinkItem>,
    pub info_updates: Vec<UpdateItem>,
    pub changelog: Vec<ChangelogItem>,
    pub suggestions_text: Option<String>,
    pub suggestions_url: Option<String>,
}

const SHEET: SheetSlot = SheetSlot::Information;

pub(crate) fn extract(grids: &WorkbookGrids, sink: &mut Sink) -> InfoSection {
    let mut out = InfoSection::default();
    let Some(sheet) = optional_sheet(
        grids,
        SHEET,
        "metadata and dynamic content will be unavailable",
        sink,
    ) else {
        return out;
    };
    let system = grids.date_system;

    if sheet.row_count() < 5 {
        sink.push(Diagnostic::warning(
            SHEET.display_name(),
            "too few rows for essential metadata (B1..B5)",
        ));
    }

    let date_at = |row: u32| coerce_date(sheet.cell(row, 1), system);
    out.website_last_updated = date_at(0).map(format_date_long);
    out.hours_last_updated = date_at(1).map(format_date_long);
    out.semester1_start = date_at(2);
    out.semester2_start = date_at(3);
    out.semester2_end = date_at(4);

    if out.semester1_start.is_none() {
        sink.push(
            Diagnostic::error(
                SHEET.display_name(),
                "semester 1 start date is missing or invalid; \
                 hour attribution will degrade to zero for every member",
            )
            .at(CellRef::new(2, 1)),
        );
    }

    // Splash texts live in column R from row 2 down.
    for row in 1..sheet.row_count() {
        let text = sheet.cell(row, 17).text();
        if !text.is_empty() {
            out.splash_texts.push(text.into_owned());
        }
    }

    // Suggestions box: O8 text, P8 button URL.
    if sheet.row_count() > 7 {
        out.suggestions_text = non_empty(sheet.cell(7, 14));
        out.suggestions_url = non_empty(sheet.cell(7, 15));
    } else {
        sink.push(Diagnostic::warning(
            SHEET.display_name(),
            "no row 8 for the suggestions box (O8, P8)",
        ));
    }

    // Four independent lists share the rows from row 8 down, each in its
    // own column band. A row contributes to a list when any of that list's
    // columns is populated.
    for row in 7..sheet.row_count() {
        let cells = |cols: &[u32]| cols.iter().any(|&c| !sheet.cell(row, c).is_blank());

        if cells(&[0, 1, 2]) {
            out.upcoming_events.push(EventItem {
                id: format!("event-{row}"),
                date_label: date_label(sheet.cell(row, 0), system),
                name: sheet.cell(row, 1).text().into_owned(),
                description: sheet.cell(row, 2).text().into_owned(),
            });
        }
        if cells(&[4, 5]) {
            out.links.push(LinkItem {
                id: format!("link-{row}"),
                text: sheet.cell(row, 4).text().into_owned(),
                url: sheet.cell(row, 5).text().into_owned(),
            });
        }
        if cells(&[7, 8, 9]) {
            out.info_updates.push(UpdateItem {
                id: format!("update-{row}"),
                date_label: date_label(sheet.cell(row, 7), system),
                header: sheet.cell(row, 8).text().into_owned(),
                content: sheet.cell(row, 9).text().into_owned(),
            });
        }
        if cells(&[11, 12]) {
            out.changelog.push(ChangelogItem {
                id: format!("changelog-{row}"),
                date_label: date_label(sheet.cell(row, 11), system),
                content: sheet.cell(row, 12).text().into_owned(),
            });
        }
    }

    out
}

fn non_empty(cell: &CellScalar) -> Option<String> {
    let text = cell.text();
    (!text.is_empty()).then(|| text.into_owned())
}

/// Long label when the cell parses as a date; the raw text otherwise (the
/// author may have typed something like "TBD").
fn date_label(cell: &CellScalar, system: DateSystem) -> String {
    match coerce_date(cell, system) {
        Some(date) => format_date_long(date),
        None => match cell {
            CellScalar::Text(s) => s.trim().to_string(),
            _ => String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapter_model::SheetGrid;
    use pretty_assertions::assert_eq;

    fn grids_with_info(sheet: SheetGrid) -> WorkbookGrids {
        WorkbookGrids {
            sheets: vec![
                SheetGrid::new("HourTracker"),
                SheetGrid::new("AdditionalHours"),
                sheet,
            ],
            date_system: DateSystem::Excel1900,
        }
    }

    #[test]
    fn reads_fixed_metadata_cells() {
        let mut sheet = SheetGrid::new("Information");
        sheet.set(CellRef::new(0, 1), CellScalar::Text("8/20/2025".into()));
        sheet.set(CellRef::new(1, 1), CellScalar::Number(45889.0)); // 2025-08-20
        sheet.set(CellRef::new(2, 1), CellScalar::Text("8/1/2025".into()));
        sheet.set(CellRef::new(3, 1), CellScalar::Text("1/6/2026".into()));
        sheet.set(CellRef::new(4, 1), CellScalar::Text("5/29/2026".into()));

        let mut sink = Sink::default();
        let info = extract(&grids_with_info(sheet), &mut sink);

        assert_eq!(info.website_last_updated.as_deref(), Some("20 August 2025"));
        assert_eq!(info.hours_last_updated.as_deref(), Some("20 August 2025"));
        assert_eq!(
            info.semester1_start,
            NaiveDate::from_ymd_opt(2025, 8, 1)
        );
        assert_eq!(info.semester2_start, NaiveDate::from_ymd_opt(2026, 1, 6));
        assert_eq!(info.semester2_end, NaiveDate::from_ymd_opt(2026, 5, 29));
    }

    #[test]
    fn missing_semester1_start_is_an_error_diagnostic() {
        let sheet = SheetGrid::new("Information");
        let mut sink = Sink::default();
        let info = extract(&grids_with_info(sheet), &mut sink);

        assert_eq!(info.semester1_start, None);
        assert!(sink
            .items
            .iter()
            .any(|d| d.severity == chapter_model::Severity::Error
                && d.message.contains("semester 1 start")));
    }

    #[test]
    fn dynamic_lists_pick_up_partially_filled_rows() {
        let mut sheet = SheetGrid::new("Information");
        sheet.set(CellRef::new(2, 1), CellScalar::Text("8/1/2025".into()));
        // Row 9 (index 8): an event with a non-date label and a link.
        sheet.set(CellRef::new(8, 0), CellScalar::Text("TBD".into()));
        sheet.set(CellRef::new(8, 1), CellScalar::Text("Bake Sale".into()));
        sheet.set(CellRef::new(8, 4), CellScalar::Text("Handbook".into()));
        sheet.set(
            CellRef::new(8, 5),
            CellScalar::Text("https://example.com".into()),
        );

        let mut sink = Sink::default();
        let info = extract(&grids_with_info(sheet), &mut sink);

        assert_eq!(info.upcoming_events.len(), 1);
        assert_eq!(info.upcoming_events[0].id, "event-8");
        assert_eq!(info.upcoming_events[0].date_label, "TBD");
        assert_eq!(info.upcoming_events[0].name, "Bake Sale");
        assert_eq!(info.links.len(), 1);
        assert_eq!(info.links[0].url, "https://example.com");
        assert!(info.info_updates.is_empty());
    }
}
