//! OPC container decode: workbook bytes in, per-sheet cell grids out.
//!
//! Only the parts needed to materialize cell values are inflated: the
//! workbook part (sheet order + date system), its relationships (sheet part
//! paths), the shared strings table, and each worksheet part. Styles,
//! themes, drawings, and every other part are irrelevant to normalization
//! and are never read.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom};

use quick_xml::events::attributes::AttrError;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

use chapter_model::SheetGrid;

use crate::datetime::DateSystem;
use crate::shared_strings::parse_shared_strings_xml;
use crate::sheet::parse_sheet_grid;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

#[derive(Debug, Error)]
pub enum WorkbookReadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttr(#[from] AttrError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("missing required part: {0}")]
    MissingPart(&'static str),
    #[error("malformed sharedStrings.xml: {0}")]
    MalformedSharedStrings(&'static str),
    #[error("worksheet part {part:?} referenced from workbook.xml.rels is missing")]
    MissingWorksheetPart { part: String },
    #[error("invalid cell reference {reference:?} in sheet {sheet:?}")]
    InvalidCellRef { reference: String, sheet: String },
}

/// The decoded workbook: sheet grids in workbook order plus the date system
/// needed to interpret serial date values.
#[derive(Clone, Debug)]
pub struct WorkbookGrids {
    pub sheets: Vec<SheetGrid>,
    pub date_system: DateSystem,
}

/// Decode workbook bytes into per-sheet cell grids.
pub fn read_workbook_grids(bytes: &[u8]) -> Result<WorkbookGrids, WorkbookReadError> {
    read_workbook_grids_from_reader(Cursor::new(bytes))
}

/// Decode a workbook from a seekable reader (e.g. an open file).
pub fn read_workbook_grids_from_reader<R: Read + Seek>(
    mut reader: R,
) -> Result<WorkbookGrids, WorkbookReadError> {
    // Callers may pass a reused reader; start from the beginning.
    reader.seek(SeekFrom::Start(0))?;
    let mut archive = ZipArchive::new(reader)?;

    let workbook_xml = read_zip_part(&mut archive, WORKBOOK_PART)?
        .ok_or(WorkbookReadError::MissingPart(WORKBOOK_PART))?;
    let workbook_rels = read_zip_part(&mut archive, WORKBOOK_RELS_PART)?
        .ok_or(WorkbookReadError::MissingPart(WORKBOOK_RELS_PART))?;

    let rels = parse_relationships(&workbook_rels)?;
    let (date_system, sheet_entries) = parse_workbook_part(&workbook_xml, &rels.id_to_target)?;

    let shared_strings_part = rels
        .shared_strings_target
        .as_deref()
        .map(|target| resolve_target(WORKBOOK_PART, target))
        .unwrap_or_else(|| "xl/sharedStrings.xml".to_string());
    let shared_strings = match read_zip_part(&mut archive, &shared_strings_part)? {
        Some(bytes) => parse_shared_strings_xml(std::str::from_utf8(&bytes)?)?,
        None => Vec::new(),
    };

    let mut sheets = Vec::with_capacity(sheet_entries.len());
    for entry in sheet_entries {
        let sheet_xml = read_zip_part(&mut archive, &entry.path)?.ok_or_else(|| {
            WorkbookReadError::MissingWorksheetPart {
                part: entry.path.clone(),
            }
        })?;
        sheets.push(parse_sheet_grid(&sheet_xml, &entry.name, &shared_strings)?);
    }

    Ok(WorkbookGrids {
        sheets,
        date_system,
    })
}

struct SheetEntry {
    name: String,
    path: String,
}

struct RelationshipsInfo {
    id_to_target: BTreeMap<String, String>,
    shared_strings_target: Option<String>,
}

fn read_zip_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, WorkbookReadError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn parse_relationships(bytes: &[u8]) -> Result<RelationshipsInfo, WorkbookReadError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut id_to_target = BTreeMap::new();
    let mut shared_strings_target = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Relationship") =>
            {
                let mut id = None;
                let mut type_ = None;
                let mut target = None;
                let mut target_mode = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = local_name(attr.key.as_ref());
                    if key.eq_ignore_ascii_case(b"Id") {
                        id = Some(attr.unescape_value()?.into_owned());
                    } else if key.eq_ignore_ascii_case(b"Type") {
                        type_ = Some(attr.unescape_value()?.into_owned());
                    } else if key.eq_ignore_ascii_case(b"Target") {
                        target = Some(attr.unescape_value()?.into_owned());
                    } else if key.eq_ignore_ascii_case(b"TargetMode") {
                        target_mode = Some(attr.unescape_value()?.into_owned());
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    // External targets are URIs, not OPC part names; they
                    // never resolve to worksheet parts.
                    if target_mode
                        .as_deref()
                        .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External"))
                    {
                        continue;
                    }
                    if type_.as_deref() == Some(REL_TYPE_SHARED_STRINGS) {
                        shared_strings_target.get_or_insert_with(|| target.clone());
                    }
                    id_to_target.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(RelationshipsInfo {
        id_to_target,
        shared_strings_target,
    })
}

fn parse_workbook_part(
    workbook_xml: &[u8],
    rels: &BTreeMap<String, String>,
) -> Result<(DateSystem, Vec<SheetEntry>), WorkbookReadError> {
    let mut reader = Reader::from_reader(workbook_xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut date_system = DateSystem::Excel1900;
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"workbookPr" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"date1904" {
                        let val = attr.unescape_value()?.into_owned();
                        if val == "1" || val.eq_ignore_ascii_case("true") {
                            date_system = DateSystem::Excel1904;
                        }
                    }
                }
            }
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut r_id = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    let key = attr.key.as_ref();
                    match key {
                        b"name" => name = Some(attr.unescape_value()?.into_owned()),
                        _ if local_name(key) == b"id" => {
                            r_id = Some(attr.unescape_value()?.into_owned());
                        }
                        _ => {}
                    }
                }
                let name = name.unwrap_or_else(|| "Sheet".to_string());
                let relationship_id = r_id.unwrap_or_else(|| "rId1".to_string());
                let target = rels
                    .get(&relationship_id)
                    .cloned()
                    .unwrap_or_else(|| "worksheets/sheet1.xml".to_string());
                let path = resolve_target(WORKBOOK_PART, &target);
                sheets.push(SheetEntry { name, path });
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((date_system, sheets))
}

/// Resolve a relationship target against its source part's directory.
fn resolve_target(source_part: &str, target: &str) -> String {
    // Targets are URIs; strip any fragment before resolving.
    let target = target.split('#').next().unwrap_or(target);
    if target.is_empty() {
        return normalize(source_part);
    }
    if let Some(target) = target.strip_prefix('/') {
        return normalize(target);
    }

    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(&format!("{base_dir}/{target}"))
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Strip an XML namespace prefix (`r:id` -> `id`).
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_target_relative_to_source_dir() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "../docProps/core.xml"),
            "docProps/core.xml"
        );
    }

    #[test]
    fn resolve_target_handles_absolute_and_fragments() {
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/sharedStrings.xml"),
            "xl/sharedStrings.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml#rId1"),
            "xl/worksheets/sheet1.xml"
        );
    }

    #[test]
    fn local_name_strips_prefixes() {
        assert_eq!(local_name(b"r:id"), b"id");
        assert_eq!(local_name(b"name"), b"name");
    }
}
