//! Worksheet part parsing: streaming SpreadsheetML into a [`SheetGrid`].
//!
//! Formulas are irrelevant here; when a cell carries one, only its cached
//! `<v>` result is kept. Error cells (`t="e"`) land as empty so a `#REF!`
//! in a hand-edited sheet reads like a blank, not like the text `#REF!`.

use quick_xml::events::Event;
use quick_xml::Reader;

use chapter_model::{CellRef, CellScalar, SheetGrid};

use crate::container::WorkbookReadError;

pub(crate) fn parse_sheet_grid(
    sheet_xml: &[u8],
    sheet_name: &str,
    shared_strings: &[String],
) -> Result<SheetGrid, WorkbookReadError> {
    let mut reader = Reader::from_reader(sheet_xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut grid = SheetGrid::new(sheet_name);

    let mut in_sheet_data = false;
    let mut current_ref: Option<CellRef> = None;
    let mut current_t: Option<String> = None;
    let mut current_value_text: Option<String> = None;
    let mut current_inline_text: Option<String> = None;
    let mut in_v = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"sheetData" => in_sheet_data = true,
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => in_sheet_data = false,

            Event::Start(e) if in_sheet_data && e.local_name().as_ref() == b"c" => {
                current_ref = None;
                current_t = None;
                current_value_text = None;
                current_inline_text = None;
                in_v = false;

                for attr in e.attributes() {
                    let attr = attr?;
                    match attr.key.as_ref() {
                        b"r" => {
                            let a1 = attr.unescape_value()?.into_owned();
                            current_ref = Some(CellRef::from_a1(&a1).map_err(|_| {
                                WorkbookReadError::InvalidCellRef {
                                    reference: a1,
                                    sheet: sheet_name.to_string(),
                                }
                            })?);
                        }
                        b"t" => current_t = Some(attr.unescape_value()?.into_owned()),
                        _ => {}
                    }
                }
            }
            // A self-closing `<c/>` carries no value; nothing to record.
            Event::Empty(e) if in_sheet_data && e.local_name().as_ref() == b"c" => {}
            Event::End(e) if in_sheet_data && e.local_name().as_ref() == b"c" => {
                if let Some(cell_ref) = current_ref.take() {
                    let value = interpret_cell_value(
                        current_t.as_deref(),
                        current_value_text.take(),
                        current_inline_text.take(),
                        shared_strings,
                    );
                    if value != CellScalar::Empty {
                        grid.set(cell_ref, value);
                    }
                }
                current_t = None;
                in_v = false;
            }

            Event::Start(e)
                if in_sheet_data && current_ref.is_some() && e.local_name().as_ref() == b"v" =>
            {
                in_v = true;
            }
            Event::End(e) if in_sheet_data && e.local_name().as_ref() == b"v" => in_v = false,
            Event::Text(e) if in_sheet_data && in_v => {
                current_value_text = Some(e.unescape()?.into_owned());
            }

            Event::Start(e)
                if in_sheet_data
                    && current_ref.is_some()
                    && current_t.as_deref() == Some("inlineStr")
                    && e.local_name().as_ref() == b"is" =>
            {
                current_inline_text = Some(read_inline_text(&mut reader)?);
            }
            Event::Empty(e)
                if in_sheet_data
                    && current_ref.is_some()
                    && current_t.as_deref() == Some("inlineStr")
                    && e.local_name().as_ref() == b"is" =>
            {
                current_inline_text = Some(String::new());
            }

            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(grid)
}

fn interpret_cell_value(
    t: Option<&str>,
    value_text: Option<String>,
    inline_text: Option<String>,
    shared_strings: &[String],
) -> CellScalar {
    match t {
        Some("s") => {
            let idx = value_text
                .as_deref()
                .and_then(|v| v.trim().parse::<usize>().ok());
            match idx.and_then(|i| shared_strings.get(i)) {
                Some(s) => CellScalar::Text(s.clone()),
                // Out-of-range shared string indices are producer bugs;
                // treat them as blank rather than failing the sheet.
                None => CellScalar::Empty,
            }
        }
        Some("inlineStr") => match inline_text {
            Some(s) => CellScalar::Text(s),
            None => CellScalar::Empty,
        },
        Some("str") => match value_text {
            Some(s) => CellScalar::Text(s),
            None => CellScalar::Empty,
        },
        Some("b") => match value_text.as_deref().map(str::trim) {
            Some("1") => CellScalar::Bool(true),
            Some("0") => CellScalar::Bool(false),
            _ => CellScalar::Empty,
        },
        Some("e") => CellScalar::Empty,
        // `t="n"` or no type attribute: numeric.
        _ => match value_text.and_then(|v| v.trim().parse::<f64>().ok()) {
            Some(n) => CellScalar::Number(n),
            None => CellScalar::Empty,
        },
    }
}

/// Concatenate the visible text of an `<is>` inline string, skipping
/// phonetic subtrees just like the shared-strings parser.
fn read_inline_text(reader: &mut Reader<&[u8]>) -> Result<String, WorkbookReadError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_t = false;
    let mut depth_skip: usize = 0;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if depth_skip == 0 && e.local_name().as_ref() == b"t" => in_t = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_t = false,
            Event::Start(e) if e.local_name().as_ref() == b"rPh" => depth_skip += 1,
            Event::End(e) if e.local_name().as_ref() == b"rPh" => {
                depth_skip = depth_skip.saturating_sub(1)
            }
            Event::Text(e) if in_t && depth_skip == 0 => {
                text.push_str(&e.unescape()?);
            }
            Event::End(e) if e.local_name().as_ref() == b"is" => break,
            Event::Eof => {
                return Err(WorkbookReadError::MalformedSharedStrings(
                    "unexpected eof in <is>",
                ))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
