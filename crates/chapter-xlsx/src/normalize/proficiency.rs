//! Member proficiency records from the MemberDetails sheet.
//!
//! Rows from row 6 carry a member name in column A followed by one course
//! name per cell from column B rightward. Each course name resolves against
//! the subject taxonomy case-insensitively; the first subject declaring the
//! course wins. Results are grouped per subject, in taxonomy order, with
//! duplicate courses collapsed.

use chapter_model::{
    resolve_course, CellRef, Diagnostic, MemberProficiency, Subject, SubjectProficiency,
};

use crate::container::WorkbookGrids;
use crate::normalize::{optional_sheet, SheetSlot, Sink};

const SLOT: SheetSlot = SheetSlot::MemberDetails;
const ROWS_FROM: u32 = 5;

pub(crate) fn extract(
    grids: &WorkbookGrids,
    subjects: &[Subject],
    sink: &mut Sink,
) -> Vec<MemberProficiency> {
    let Some(sheet) = optional_sheet(grids, SLOT, "no proficiencies will be available", sink)
    else {
        return Vec::new();
    };

    if sheet.row_count() <= ROWS_FROM {
        sink.push(Diagnostic::warning(
            SLOT.display_name(),
            format!(
                "no member rows from row {} down; no proficiencies will be available",
                ROWS_FROM + 1
            ),
        ));
        return Vec::new();
    }

    let mut records = Vec::new();
    for row in ROWS_FROM..sheet.row_count() {
        let name = sheet.cell(row, 0).text();
        if name.is_empty() {
            continue;
        }

        // One bucket per subject, keyed by taxonomy index so output order
        // follows the taxonomy.
        let mut buckets: Vec<Option<SubjectProficiency>> = vec![None; subjects.len()];
        for col in 1..sheet.row(row).len() as u32 {
            let cell = sheet.cell(row, col);
            if cell.is_blank() {
                continue;
            }
            let course_name = cell.text();
            let Some((subject, course)) = resolve_course(subjects, course_name.as_ref()) else {
                sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!(
                            "course {course_name:?} for member {name:?} matches no subject; \
                             skipping it"
                        ),
                    )
                    .at(CellRef::new(row, col)),
                );
                continue;
            };
            let idx = subjects
                .iter()
                .position(|s| s.id == subject.id)
                .unwrap_or_default();
            let bucket = buckets[idx].get_or_insert_with(|| SubjectProficiency {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                subject_color: subject.color.clone(),
                courses: Vec::new(),
                count: 0,
            });
            if !bucket.courses.iter().any(|c| c.name == course.name) {
                bucket.courses.push(course.clone());
                bucket.count += 1;
            }
        }

        records.push(MemberProficiency {
            id: format!("member-prof-{row}"),
            name: name.into_owned(),
            by_subject: buckets.into_iter().flatten().collect(),
        });
    }

    records
}
