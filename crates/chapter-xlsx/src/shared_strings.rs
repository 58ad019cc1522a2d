//! Plain-text shared strings parsing.
//!
//! The chapter workbook never uses run-level formatting for anything the
//! normalizer cares about, so each `<si>` collapses to its visible string:
//! direct `<t>` children plus `<r><t>` run text, with phonetic/ruby subtrees
//! (`<rPh>`) skipped so their `<t>` nodes don't leak into the display text.

use std::borrow::Cow;

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::container::WorkbookReadError;

pub(crate) fn parse_shared_strings_xml(xml: &str) -> Result<Vec<String>, WorkbookReadError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut items = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"si" => {
                items.push(parse_si(&mut reader)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                items.push(String::new());
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

fn parse_si(reader: &mut Reader<&[u8]>) -> Result<String, WorkbookReadError> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                text.push_str(&read_text(reader, QName(b"t"))?);
            }
            Event::Start(e) if e.local_name().as_ref() == b"r" => {
                text.push_str(&parse_r(reader)?);
            }
            Event::Start(e) => {
                // Phonetic runs, extensions, and other subtrees may contain
                // `<t>` nodes that are not part of the displayed string.
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.local_name().as_ref() == b"si" => break,
            Event::Eof => {
                return Err(WorkbookReadError::MalformedSharedStrings(
                    "unexpected eof in <si>",
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn parse_r(reader: &mut Reader<&[u8]>) -> Result<String, WorkbookReadError> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                text.push_str(&read_text(reader, QName(b"t"))?);
            }
            Event::Start(e) => {
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.local_name().as_ref() == b"r" => break,
            Event::Eof => {
                return Err(WorkbookReadError::MalformedSharedStrings(
                    "unexpected eof in <r>",
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn read_text(reader: &mut Reader<&[u8]>, end: QName<'_>) -> Result<String, WorkbookReadError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => {
                let t: Cow<'_, str> = e.unescape()?;
                text.push_str(&t);
            }
            Event::CData(e) => {
                text.push_str(std::str::from_utf8(e.as_ref())?);
            }
            Event::End(e) if e.name() == end => break,
            Event::Eof => {
                return Err(WorkbookReadError::MalformedSharedStrings(
                    "unexpected eof in <t>",
                ))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}
