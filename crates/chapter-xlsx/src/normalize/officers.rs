//! Officer roster from the Officers sheet.
//!
//! Rows from row 3: name (A), role (B), email (C), description (D). Portrait
//! images are base64 payloads split across consecutive cells from column E
//! rightward (spreadsheet cells cap out long before a photo does); the
//! secondary image for the same officer sits 23 rows below on the same
//! columns.

use chapter_model::{Diagnostic, Officer, SheetGrid};

use crate::container::WorkbookGrids;
use crate::normalize::{optional_sheet, SheetSlot, Sink};

const SLOT: SheetSlot = SheetSlot::Officers;
const ROWS_FROM: u32 = 2;
const IMAGE_COL: u32 = 4;
const SECONDARY_ROW_OFFSET: u32 = 23;

const DEFAULT_DESCRIPTION: &str = "No description provided.";

/// 1x1 transparent GIF shown when an officer has no uploaded portrait.
const TRANSPARENT_PIXEL: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

pub(crate) fn extract(grids: &WorkbookGrids, sink: &mut Sink) -> Vec<Officer> {
    let Some(sheet) = optional_sheet(grids, SLOT, "no officers will be available", sink) else {
        return Vec::new();
    };

    let mut officers = Vec::new();
    for row in ROWS_FROM..sheet.row_count() {
        let name = sheet.cell(row, 0).text();
        if name.is_empty() {
            continue;
        }

        let role = sheet.cell(row, 1).text();
        let description = sheet.cell(row, 3).text();
        let officer = Officer {
            id: format!("officer-{row}"),
            name: name.into_owned(),
            role: if role.is_empty() {
                "Officer".to_owned()
            } else {
                role.into_owned()
            },
            email: sheet.cell(row, 2).text().into_owned(),
            description: if description.is_empty() {
                DEFAULT_DESCRIPTION.to_owned()
            } else {
                description.into_owned()
            },
            image: image_data(sheet, row).unwrap_or_else(|| TRANSPARENT_PIXEL.to_owned()),
            secondary_image: image_data(sheet, row + SECONDARY_ROW_OFFSET),
        };
        officers.push(officer);
    }

    if officers.is_empty() {
        sink.push(Diagnostic::warning(
            SLOT.display_name(),
            format!("no officer rows from row {} down", ROWS_FROM + 1),
        ));
    }

    officers
}

/// Reassemble a base64 image from consecutive cells, stopping at the first
/// blank. Payloads already carrying a data URI prefix pass through; `None`
/// means the cells held nothing.
fn image_data(sheet: &SheetGrid, row: u32) -> Option<String> {
    let mut payload = String::new();
    let mut col = IMAGE_COL;
    loop {
        let chunk = sheet.cell(row, col).text();
        if chunk.is_empty() {
            break;
        }
        payload.push_str(chunk.as_ref());
        col += 1;
    }

    if payload.is_empty() {
        None
    } else if payload.starts_with("data:image") {
        Some(payload)
    } else {
        Some(format!("data:image/png;base64,{payload}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chapter_model::{CellRef, CellScalar};
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> CellScalar {
        CellScalar::Text(s.into())
    }

    fn grids(sheet: SheetGrid) -> WorkbookGrids {
        let mut sheets: Vec<SheetGrid> =
            (0..3).map(|i| SheetGrid::new(format!("S{i}"))).collect();
        sheets.push(sheet);
        WorkbookGrids {
            sheets,
            date_system: Default::default(),
        }
    }

    #[test]
    fn image_chunks_concatenate_until_a_blank() {
        let mut sheet = SheetGrid::new("Officers");
        sheet.set(CellRef::new(ROWS_FROM, 0), text("Dana Lee"));
        sheet.set(CellRef::new(ROWS_FROM, 1), text("President"));
        sheet.set(CellRef::new(ROWS_FROM, 2), text("dana@example.org"));
        sheet.set(CellRef::new(ROWS_FROM, IMAGE_COL), text("iVBORw0K"));
        sheet.set(CellRef::new(ROWS_FROM, IMAGE_COL + 1), text("GgoAAAAN"));
        sheet.set(CellRef::new(ROWS_FROM, IMAGE_COL + 3), text("orphan"));

        let mut sink = Sink::default();
        let officers = extract(&grids(sheet), &mut sink);

        assert_eq!(officers.len(), 1);
        let o = &officers[0];
        assert_eq!(o.role, "President");
        assert_eq!(o.image, "data:image/png;base64,iVBORw0KGgoAAAAN");
        assert_eq!(o.secondary_image, None);
    }

    #[test]
    fn missing_role_and_image_take_defaults() {
        let mut sheet = SheetGrid::new("Officers");
        sheet.set(CellRef::new(ROWS_FROM, 0), text("Sam Park"));
        sheet.set(
            CellRef::new(ROWS_FROM + 1, IMAGE_COL),
            text("data:image/jpeg;base64,AAAA"),
        );
        sheet.set(CellRef::new(ROWS_FROM + 1, 0), text("Riley Cho"));

        let mut sink = Sink::default();
        let officers = extract(&grids(sheet), &mut sink);

        assert_eq!(officers.len(), 2);
        assert_eq!(officers[0].role, "Officer");
        assert_eq!(officers[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(officers[0].image, TRANSPARENT_PIXEL);
        // A payload that already carries a data URI keeps its own type.
        assert_eq!(officers[1].image, "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn empty_roster_warns() {
        let sheet = SheetGrid::new("Officers");
        let mut sink = Sink::default();
        assert!(extract(&grids(sheet), &mut sink).is_empty());
        assert_eq!(sink.items.len(), 1);
    }
}
