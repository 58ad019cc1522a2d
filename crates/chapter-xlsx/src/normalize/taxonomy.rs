//! Subject and course taxonomy from the Subjects sheet.
//!
//! Rows from row 2 carry, in columns Q through T: subject name, the A1
//! reference of the first course cell, the A1 reference of the last course
//! cell, and the subject's hex color. Course names live at the referenced
//! range in the same sheet, one per row, each with its color in the column
//! immediately to the right.

use chapter_model::{CellRef, Course, Diagnostic, Range, SheetGrid, Subject};

use crate::container::WorkbookGrids;
use crate::normalize::{optional_sheet, SheetSlot, Sink};

const SLOT: SheetSlot = SheetSlot::Subjects;

const NAME_COL: u32 = 16;
const RANGE_START_COL: u32 = 17;
const RANGE_END_COL: u32 = 18;
const COLOR_COL: u32 = 19;

pub(crate) const DEFAULT_SUBJECT_COLOR: &str = "#6B7280";
pub(crate) const DEFAULT_COURSE_COLOR: &str = "#4B5563";

pub(crate) fn extract(grids: &WorkbookGrids, sink: &mut Sink) -> Vec<Subject> {
    let Some(sheet) = optional_sheet(grids, SLOT, "no subjects will be available", sink) else {
        return Vec::new();
    };

    let mut subjects = Vec::new();
    for row in 1..sheet.row_count() {
        let name = sheet.cell(row, NAME_COL).text();
        let start = sheet.cell(row, RANGE_START_COL).text();
        let end = sheet.cell(row, RANGE_END_COL).text();
        if name.is_empty() && start.is_empty() && end.is_empty() {
            continue;
        }
        if name.is_empty() {
            sink.push(
                Diagnostic::warning(SLOT.display_name(), "subject row has no name; skipping")
                    .at(CellRef::new(row, NAME_COL)),
            );
            continue;
        }
        if start.is_empty() || end.is_empty() {
            sink.push(
                Diagnostic::warning(
                    SLOT.display_name(),
                    format!("subject {name:?} is missing a course range reference; skipping"),
                )
                .at(CellRef::new(row, RANGE_START_COL)),
            );
            continue;
        }

        let color = hex_color(
            sheet.cell(row, COLOR_COL).text().as_ref(),
            DEFAULT_SUBJECT_COLOR,
            SLOT.display_name(),
            CellRef::new(row, COLOR_COL),
            sink,
        );
        let mut subject = Subject::new(name.into_owned(), color);

        match course_range(start.as_ref(), end.as_ref()) {
            Ok(range) => {
                if range.width() != 1 {
                    sink.push(
                        Diagnostic::warning(
                            SLOT.display_name(),
                            format!(
                                "course range for {:?} spans {} columns; expected a single column, \
                                 keeping the subject with no courses",
                                subject.name,
                                range.width()
                            ),
                        )
                        .at(CellRef::new(row, RANGE_START_COL)),
                    );
                } else {
                    collect_courses(sheet, range, &mut subject, sink);
                }
            }
            Err(bad) => {
                sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!(
                            "course range for {:?} has an unparsable cell reference {bad:?}; \
                             keeping the subject with no courses",
                            subject.name
                        ),
                    )
                    .at(CellRef::new(row, RANGE_START_COL)),
                );
            }
        }

        subjects.push(subject);
    }

    subjects
}

/// Parse the start/end references into a normalized range. An unparsable
/// reference is an error carrying the offending text.
fn course_range(start: &str, end: &str) -> Result<Range, String> {
    let start_ref = CellRef::from_a1(start).map_err(|_| start.to_owned())?;
    let end_ref = CellRef::from_a1(end).map_err(|_| end.to_owned())?;
    Ok(Range::new(start_ref, end_ref))
}

fn collect_courses(sheet: &SheetGrid, range: Range, subject: &mut Subject, sink: &mut Sink) {
    let col = range.start.col;
    for row in range.start.row..=range.end.row {
        let name = sheet.cell(row, col).text();
        if name.is_empty() {
            continue;
        }
        let color = hex_color(
            sheet.cell(row, col + 1).text().as_ref(),
            DEFAULT_COURSE_COLOR,
            SLOT.display_name(),
            CellRef::new(row, col + 1),
            sink,
        );
        subject.add_course(Course {
            name: name.into_owned(),
            color,
        });
    }
}

/// Normalize a hex color string: a leading `#` is optional, and both short
/// (`#RGB`) and full (`#RRGGBB`) forms are accepted, uppercased. Missing
/// values take the default silently; malformed ones take it with a warning.
fn hex_color(
    raw: &str,
    default: &str,
    sheet_name: &'static str,
    cell: CellRef,
    sink: &mut Sink,
) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default.to_owned();
    }
    let candidate = if trimmed.starts_with('#') {
        trimmed.to_owned()
    } else {
        format!("#{trimmed}")
    };
    let digits = &candidate[1..];
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        candidate.to_uppercase()
    } else {
        sink.push(
            Diagnostic::warning(
                sheet_name,
                format!("invalid color {trimmed:?}; using {default}"),
            )
            .at(cell),
        );
        default.to_owned()
    }
}
