//! Hour ledger aggregation from the HourTracker and AdditionalHours sheets.
//!
//! HourTracker layout: row 2 carries a date at every other column starting
//! at B, row 3 the AM/PM labels beneath each date, and member rows start at
//! row 5 with the name in column A. Each populated date yields an (AM, PM)
//! column pair whose values are bucketed by semester.
//!
//! Bucketing policy: dates on/after the semester-2 start belong to semester
//! 2 unless they reach the semester-2 end (those are out-of-term and
//! dropped); otherwise dates on/after the semester-1 start belong to
//! semester 1; earlier dates are ignored.

use chrono::NaiveDate;

use chapter_model::{
    AdditionalHourEntry, CellRef, CellScalar, DailyHourEntry, Diagnostic, Member, Semester,
    Session, SheetGrid,
};

use crate::container::WorkbookGrids;
use crate::datetime::coerce_date;
use crate::normalize::{optional_sheet, NormalizeError, SheetSlot, Sink};

/// The three boundary dates from the Information sheet. Everything is
/// optional; [`classify`] treats a missing boundary as an open interval on
/// that side.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SemesterBoundaries {
    pub semester1_start: Option<NaiveDate>,
    pub semester2_start: Option<NaiveDate>,
    pub semester2_end: Option<NaiveDate>,
}

/// Where a dated entry lands relative to the semester boundaries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bucket {
    Semester(Semester),
    BeforeTerm,
    OutOfTerm,
}

/// Boundary policy: inclusive at each start, exclusive at the semester-2
/// end. Only meaningful when a semester-1 start exists.
fn classify(date: NaiveDate, boundaries: &SemesterBoundaries) -> Bucket {
    if let Some(s2_start) = boundaries.semester2_start {
        if date >= s2_start {
            if boundaries.semester2_end.is_some_and(|end| date >= end) {
                return Bucket::OutOfTerm;
            }
            return Bucket::Semester(Semester::Second);
        }
    }
    match boundaries.semester1_start {
        Some(s1_start) if date >= s1_start => Bucket::Semester(Semester::First),
        _ => Bucket::BeforeTerm,
    }
}

/// One (date, AM column, PM column) triple from the header rows.
struct DateSlot {
    date: NaiveDate,
    am_col: u32,
    pm_col: u32,
}

const PRIMARY: SheetSlot = SheetSlot::HourTracker;
const MEMBER_ROWS_FROM: u32 = 4;

/// Parse the primary hour sheet. This is the one part of the workbook whose
/// absence or structural breakage fails the whole parse.
pub(crate) fn extract_primary(
    grids: &WorkbookGrids,
    boundaries: &SemesterBoundaries,
    sink: &mut Sink,
) -> Result<Vec<Member>, NormalizeError> {
    let sheet = grids
        .sheets
        .first()
        .ok_or(NormalizeError::MissingPrimarySheet {
            name: PRIMARY.display_name(),
            position: PRIMARY.position(),
            found: grids.sheets.len(),
        })?;

    if sheet.row_count() < 5 {
        return Err(NormalizeError::MalformedPrimarySheet {
            name: PRIMARY.display_name(),
            detail: format!(
                "expected dates in row 2 and member rows from row 5, found {} row(s)",
                sheet.row_count()
            ),
        });
    }

    let dates_row = sheet.row(1);
    let ampm_row = sheet.row(2);
    if dates_row.iter().all(CellScalar::is_blank) || ampm_row.iter().all(CellScalar::is_blank) {
        return Err(NormalizeError::MalformedPrimarySheet {
            name: PRIMARY.display_name(),
            detail: "date header (row 2) or AM/PM header (row 3) is missing or empty".into(),
        });
    }

    // Dates sit at every other column starting at B; the column after each
    // date is its PM twin.
    let mut slots = Vec::new();
    for am_col in (1..dates_row.len() as u32).step_by(2) {
        if let Some(date) = coerce_date(sheet.cell(1, am_col), grids.date_system) {
            slots.push(DateSlot {
                date,
                am_col,
                pm_col: am_col + 1,
            });
        }
    }

    let degraded = boundaries.semester1_start.is_none();
    if degraded {
        sink.push(Diagnostic::error(
            PRIMARY.display_name(),
            "no semester 1 start date; recording every member with zero hours",
        ));
    }

    let mut members = Vec::new();
    for row in MEMBER_ROWS_FROM..sheet.row_count() {
        let name = sheet.cell(row, 0).text();
        if name.is_empty() {
            continue;
        }
        let mut member = Member::new(name.into_owned());

        if !degraded {
            for slot in &slots {
                let am = hour_value(sheet, row, slot.am_col, sink);
                let pm = hour_value(sheet, row, slot.pm_col, sink);

                let semester = match classify(slot.date, boundaries) {
                    Bucket::Semester(s) => s,
                    Bucket::BeforeTerm | Bucket::OutOfTerm => continue,
                };
                match semester {
                    Semester::First => member.semester1_hours += am + pm,
                    Semester::Second => member.semester2_hours += am + pm,
                }

                if am > 0.0 {
                    member.daily.push(DailyHourEntry {
                        date: slot.date,
                        session: Session::Am,
                        hours: am,
                        semester,
                    });
                }
                if pm > 0.0 {
                    member.daily.push(DailyHourEntry {
                        date: slot.date,
                        session: Session::Pm,
                        hours: pm,
                        semester,
                    });
                }
            }
        }

        members.push(member);
    }

    if members.is_empty() && !slots.is_empty() {
        sink.push(Diagnostic::warning(
            PRIMARY.display_name(),
            "no member rows found from row 5 down",
        ));
    }

    Ok(members)
}

const SUPPLEMENTAL: SheetSlot = SheetSlot::AdditionalHours;

/// Merge supplemental entries into the member list. Names with no primary
/// counterpart synthesize a fresh member record; see the warning text.
pub(crate) fn apply_additional(
    grids: &WorkbookGrids,
    boundaries: &SemesterBoundaries,
    members: &mut Vec<Member>,
    sink: &mut Sink,
) {
    let Some(sheet) = optional_sheet(
        grids,
        SUPPLEMENTAL,
        "additional hours will not be processed",
        sink,
    ) else {
        return;
    };

    if boundaries.semester1_start.is_none() {
        sink.push(Diagnostic::error(
            SUPPLEMENTAL.display_name(),
            "no semester 1 start date; skipping additional hours",
        ));
        return;
    }

    for row in MEMBER_ROWS_FROM..sheet.row_count() {
        let name = sheet.cell(row, 0).text();
        if name.is_empty() {
            continue;
        }

        let member_idx = match members.iter().position(|m| m.name == name) {
            Some(idx) => idx,
            None => {
                // Possibly a data-entry error in the primary sheet; keep the
                // hours rather than dropping them.
                sink.push(Diagnostic::warning(
                    SUPPLEMENTAL.display_name(),
                    format!(
                        "member {name:?} has no row in the {} sheet; creating a new entry",
                        PRIMARY.display_name()
                    ),
                ));
                members.push(Member::new(name.clone().into_owned()));
                members.len() - 1
            }
        };

        // Repeating (date, hours, notes) triples; the first empty date ends
        // the member's entries.
        let row_len = sheet.row(row).len() as u32;
        let mut date_col = 1;
        while date_col < row_len {
            let date_cell = sheet.cell(row, date_col);
            if date_cell.is_blank() {
                break;
            }
            let hours_cell = sheet.cell(row, date_col + 1);
            let notes = sheet.cell(row, date_col + 2).text().into_owned();

            let hours = hour_cell_value(hours_cell).unwrap_or_else(|| {
                if !hours_cell.is_blank() {
                    sink.push(
                        Diagnostic::warning(
                            SUPPLEMENTAL.display_name(),
                            format!(
                                "unparsable hour value {:?} for member {:?}; treating as zero",
                                hours_cell.text(),
                                members[member_idx].name
                            ),
                        )
                        .at(CellRef::new(row, date_col + 1)),
                    );
                }
                0.0
            });

            if hours > 0.0 {
                match coerce_date(date_cell, grids.date_system) {
                    Some(date) => match classify(date, boundaries) {
                        Bucket::Semester(semester) => {
                            let member = &mut members[member_idx];
                            match semester {
                                Semester::First => member.semester1_hours += hours,
                                Semester::Second => member.semester2_hours += hours,
                            }
                            member.additional.push(AdditionalHourEntry {
                                date,
                                hours,
                                notes,
                                semester,
                            });
                        }
                        Bucket::BeforeTerm | Bucket::OutOfTerm => {}
                    },
                    None => {
                        sink.push(
                            Diagnostic::warning(
                                SUPPLEMENTAL.display_name(),
                                format!(
                                    "invalid date {:?} for member {:?}; skipping this entry",
                                    date_cell.text(),
                                    members[member_idx].name
                                ),
                            )
                            .at(CellRef::new(row, date_col)),
                        );
                    }
                }
            }

            date_col += 3;
        }
    }
}

/// Numeric value of an hour cell, or `None` when it holds unparsable junk.
fn hour_cell_value(cell: &CellScalar) -> Option<f64> {
    if cell.is_blank() {
        return Some(0.0);
    }
    cell.number()
}

fn hour_value(sheet: &SheetGrid, row: u32, col: u32, sink: &mut Sink) -> f64 {
    let cell = sheet.cell(row, col);
    hour_cell_value(cell).unwrap_or_else(|| {
        sink.push(
            Diagnostic::warning(
                PRIMARY.display_name(),
                format!("unparsable hour value {:?}; treating as zero", cell.text()),
            )
            .at(CellRef::new(row, col)),
        );
        0.0
    })
}
