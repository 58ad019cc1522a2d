//! `chapter-model` defines the in-memory data structures for the chapter
//! website's data snapshot.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the `.xlsx` ingestion/normalization layer (`chapter-xlsx`)
//! - UI/IPC boundaries via `serde` (JSON-safe schema)
//!
//! A [`Snapshot`] is built once per workbook parse and is read-only
//! afterwards; nothing in this crate supports partial updates.

mod address;
mod diag;
mod display;
mod grid;
mod snapshot;

pub use address::{A1ParseError, CellRef, Range};
pub use diag::{Diagnostic, Severity};
pub use display::{format_date_long, format_date_mdy};
pub use grid::{CellScalar, SheetGrid};
pub use snapshot::{
    resolve_course, slug_id, AdditionalHourEntry, ChangelogItem, Course, DailyHourEntry, EventItem, GeneralTag,
    LinkItem, Meeting, Member, MemberProficiency, Officer, ResourceCourse, ResourceSubject,
    Semester, Session, Snapshot, StudyResource, Subject, SubjectProficiency, UpdateItem,
};
