//! Study resources and the general tag vocabulary from the StudyResources
//! sheet.
//!
//! Row 1 declares the general tag vocabulary from column B rightward.
//! Resource rows start at row 4: name (B), description (C), comma-separated
//! subject tags (D), course tags (E), link (F), and general tags (G).
//! Subject and course tags resolve against the taxonomy; course tags also
//! pull in the owning subject so a resource tagged only with "Algebra I"
//! still surfaces under Math.

use chapter_model::{
    resolve_course, slug_id, CellRef, Diagnostic, GeneralTag, ResourceCourse, ResourceSubject,
    StudyResource, Subject,
};

use crate::container::WorkbookGrids;
use crate::normalize::{optional_sheet, SheetSlot, Sink};

const SLOT: SheetSlot = SheetSlot::StudyResources;
const ROWS_FROM: u32 = 3;

pub(crate) fn extract(
    grids: &WorkbookGrids,
    subjects: &[Subject],
    sink: &mut Sink,
) -> (Vec<GeneralTag>, Vec<StudyResource>) {
    let Some(sheet) = optional_sheet(grids, SLOT, "no study resources will be available", sink)
    else {
        return (Vec::new(), Vec::new());
    };

    // Tag vocabulary: first occurrence of a slug wins, later duplicates are
    // dropped silently.
    let mut tags: Vec<GeneralTag> = Vec::new();
    for cell in sheet.row(0).iter().skip(1) {
        let name = cell.text();
        if name.is_empty() {
            continue;
        }
        let id = slug_id(&name);
        if !tags.iter().any(|t| t.id == id) {
            tags.push(GeneralTag {
                id,
                name: name.into_owned(),
            });
        }
    }

    let mut out = Vec::new();
    for row in ROWS_FROM..sheet.row_count() {
        let name = sheet.cell(row, 1).text();
        if name.is_empty() {
            continue;
        }

        let description = match sheet.cell(row, 2).text() {
            d if d.is_empty() => "No description provided.".to_owned(),
            d => d.into_owned(),
        };
        let link = match sheet.cell(row, 5).text() {
            l if l.is_empty() => None,
            l => Some(l.into_owned()),
        };

        let mut resource = StudyResource {
            id: format!("resource-{row}"),
            name: name.into_owned(),
            description,
            link,
            subjects: Vec::new(),
            courses: Vec::new(),
            general_tags: Vec::new(),
        };

        for tag in split_list(sheet.cell(row, 3).text().as_ref()) {
            match subjects.iter().find(|s| s.name.eq_ignore_ascii_case(tag)) {
                Some(subject) => push_subject(&mut resource.subjects, subject),
                None => sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!(
                            "subject tag {tag:?} on resource {:?} matches no subject; skipping it",
                            resource.name
                        ),
                    )
                    .at(CellRef::new(row, 3)),
                ),
            }
        }

        for tag in split_list(sheet.cell(row, 4).text().as_ref()) {
            match resolve_course(subjects, tag) {
                Some((subject, course)) => {
                    if !resource.courses.iter().any(|c| c.name == course.name) {
                        resource.courses.push(ResourceCourse {
                            name: course.name.clone(),
                            color: course.color.clone(),
                            subject_id: subject.id.clone(),
                        });
                    }
                    push_subject(&mut resource.subjects, subject);
                }
                None => sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!(
                            "course tag {tag:?} on resource {:?} matches no subject; skipping it",
                            resource.name
                        ),
                    )
                    .at(CellRef::new(row, 4)),
                ),
            }
        }

        for tag in split_list(sheet.cell(row, 6).text().as_ref()) {
            match tags.iter().find(|t| t.name.eq_ignore_ascii_case(tag)) {
                Some(t) => {
                    if !resource.general_tags.iter().any(|g| g.id == t.id) {
                        resource.general_tags.push(t.clone());
                    }
                }
                None => sink.push(
                    Diagnostic::warning(
                        SLOT.display_name(),
                        format!(
                            "general tag {tag:?} on resource {:?} is not declared in row 1; \
                             skipping it",
                            resource.name
                        ),
                    )
                    .at(CellRef::new(row, 6)),
                ),
            }
        }

        out.push(resource);
    }

    (tags, out)
}

/// Split a comma-separated tag cell into trimmed, non-empty items.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn push_subject(list: &mut Vec<ResourceSubject>, subject: &Subject) {
    if !list.iter().any(|s| s.id == subject.id) {
        list.push(ResourceSubject {
            id: subject.id.clone(),
            name: subject.name.clone(),
            color: subject.color.clone(),
        });
    }
}
