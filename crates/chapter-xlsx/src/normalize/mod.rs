//! Workbook normalization: positional sheets in, [`Snapshot`] out.
//!
//! The workbook carries eight sheets in a fixed order (see [`SheetSlot`]).
//! Each extractor reads exactly one sheet; the orchestrator in
//! [`parse_workbook_bytes`] runs them in dependency order (taxonomy before
//! anything that resolves course names) and assembles the result.
//!
//! Failure policy: only a missing/structurally broken primary hour sheet or
//! an undecodable container aborts. Everything else degrades — absent
//! optional sheets empty their section, and bad cells default with a
//! [`Diagnostic`] recorded.

use std::path::Path;

use thiserror::Error;

use chapter_model::{Diagnostic, Severity, SheetGrid, Snapshot};

use crate::container::{read_workbook_grids, WorkbookGrids, WorkbookReadError};

mod hours;
mod meetings;
mod metadata;
mod officers;
mod proficiency;
mod resources;
mod taxonomy;

use hours::SemesterBoundaries;

/// The eight positional sheets of the chapter workbook. Identity is by
/// position, not name; the display names here are only for messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SheetSlot {
    HourTracker,
    AdditionalHours,
    Information,
    Officers,
    MemberDetails,
    Subjects,
    StudyResources,
    MeetingInfo,
}

impl SheetSlot {
    pub const fn position(self) -> usize {
        match self {
            SheetSlot::HourTracker => 0,
            SheetSlot::AdditionalHours => 1,
            SheetSlot::Information => 2,
            SheetSlot::Officers => 3,
            SheetSlot::MemberDetails => 4,
            SheetSlot::Subjects => 5,
            SheetSlot::StudyResources => 6,
            SheetSlot::MeetingInfo => 7,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            SheetSlot::HourTracker => "HourTracker",
            SheetSlot::AdditionalHours => "AdditionalHours",
            SheetSlot::Information => "Information",
            SheetSlot::Officers => "Officers",
            SheetSlot::MemberDetails => "MemberDetails",
            SheetSlot::Subjects => "Subjects",
            SheetSlot::StudyResources => "StudyResources",
            SheetSlot::MeetingInfo => "MeetingInfo",
        }
    }
}

/// Fatal parse failures. Anything recoverable is a [`Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error(transparent)]
    Read(#[from] WorkbookReadError),
    #[error(
        "required sheet {name:?} (position {position}) is missing; \
         the workbook has only {found} sheet(s)"
    )]
    MissingPrimarySheet {
        name: &'static str,
        position: usize,
        found: usize,
    },
    #[error("sheet {name:?} is malformed: {detail}")]
    MalformedPrimarySheet {
        name: &'static str,
        detail: String,
    },
}

/// The result of one parse: the snapshot plus every diagnostic collected
/// along the way, in encounter order.
#[derive(Clone, Debug)]
pub struct ParseOutcome {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse workbook bytes into a snapshot.
pub fn parse_workbook_bytes(bytes: &[u8]) -> Result<ParseOutcome, NormalizeError> {
    let grids = read_workbook_grids(bytes)?;
    normalize(&grids)
}

/// Convenience wrapper: read a workbook file and parse it.
pub fn parse_workbook_file(path: impl AsRef<Path>) -> Result<ParseOutcome, NormalizeError> {
    let bytes = std::fs::read(path).map_err(WorkbookReadError::from)?;
    parse_workbook_bytes(&bytes)
}

/// Normalize already-decoded sheet grids.
pub fn normalize(grids: &WorkbookGrids) -> Result<ParseOutcome, NormalizeError> {
    let mut sink = Sink::default();

    let info = metadata::extract(grids, &mut sink);
    let boundaries = SemesterBoundaries {
        semester1_start: info.semester1_start,
        semester2_start: info.semester2_start,
        semester2_end: info.semester2_end,
    };

    let mut members = hours::extract_primary(grids, &boundaries, &mut sink)?;
    hours::apply_additional(grids, &boundaries, &mut members, &mut sink);

    let officers = officers::extract(grids, &mut sink);
    let subjects = taxonomy::extract(grids, &mut sink);
    let proficiencies = proficiency::extract(grids, &subjects, &mut sink);
    let (general_tags, resources) = resources::extract(grids, &subjects, &mut sink);
    let meetings = meetings::extract(grids, &mut sink);

    let snapshot = Snapshot {
        website_last_updated: info.website_last_updated,
        hours_last_updated: info.hours_last_updated,
        semester1_start: info.semester1_start,
        semester2_start: info.semester2_start,
        semester2_end: info.semester2_end,
        splash_texts: info.splash_texts,
        upcoming_events: info.upcoming_events,
        links: info.links,
        info_updates: info.info_updates,
        changelog: info.changelog,
        suggestions_text: info.suggestions_text,
        suggestions_url: info.suggestions_url,
        members,
        officers,
        subjects,
        proficiencies,
        general_tags,
        resources,
        meetings,
    };

    Ok(ParseOutcome {
        snapshot,
        diagnostics: sink.into_items(),
    })
}

/// Collects diagnostics for the caller and mirrors them to `log` for
/// operators watching the service.
#[derive(Default)]
pub(crate) struct Sink {
    items: Vec<Diagnostic>,
}

impl Sink {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Error => log::error!("{diagnostic}"),
        }
        self.items.push(diagnostic);
    }

    fn into_items(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// Fetch an optional sheet by position. When the workbook is too short the
/// section degrades: a warning describing the impact is recorded and the
/// caller gets `None`.
pub(crate) fn optional_sheet<'a>(
    grids: &'a WorkbookGrids,
    slot: SheetSlot,
    impact: &str,
    sink: &mut Sink,
) -> Option<&'a SheetGrid> {
    match grids.sheets.get(slot.position()) {
        Some(sheet) => Some(sheet),
        None => {
            sink.push(Diagnostic::warning(
                slot.display_name(),
                format!(
                    "sheet not found at position {}; {impact}",
                    slot.position() + 1
                ),
            ));
            None
        }
    }
}
