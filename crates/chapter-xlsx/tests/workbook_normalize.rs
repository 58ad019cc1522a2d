//! End-to-end tests over real XLSX bytes authored with `rust_xlsxwriter`.

use chapter_xlsx::{parse_workbook_bytes, parse_workbook_file, NormalizeError};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

const SHEET_NAMES: [&str; 8] = [
    "HourTracker",
    "AdditionalHours",
    "Information",
    "Officers",
    "MemberDetails",
    "Subjects",
    "StudyResources",
    "MeetingInfo",
];

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Eight empty sheets in canonical order.
fn blank_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    for name in SHEET_NAMES {
        workbook
            .add_worksheet()
            .set_name(name)
            .expect("sheet name");
    }
    workbook
}

fn fill_hour_tracker(ws: &mut Worksheet) -> Result<(), XlsxError> {
    ws.write_string(0, 0, "Hour Tracker")?;
    // Date headers at every other column; AM/PM labels beneath.
    ws.write_string(1, 1, "9/10/2025")?;
    ws.write_string(2, 1, "AM")?;
    ws.write_string(2, 2, "PM")?;
    ws.write_string(1, 3, "2/1/2026")?;
    ws.write_string(2, 3, "AM")?;
    ws.write_string(2, 4, "PM")?;
    ws.write_string(3, 0, "Name")?;

    ws.write_string(4, 0, "A. Smith")?;
    ws.write_number(4, 1, 2.0)?;
    ws.write_number(4, 2, 1.5)?;
    ws.write_number(4, 3, 1.0)?;

    ws.write_string(5, 0, "B. Jones")?;
    ws.write_number(5, 2, 3.0)?;
    Ok(())
}

fn fill_information(ws: &mut Worksheet) -> Result<(), XlsxError> {
    ws.write_string(0, 1, "8/25/2025")?;
    ws.write_string(1, 1, "8/24/2025")?;
    ws.write_string(2, 1, "8/1/2025")?;
    ws.write_string(3, 1, "1/6/2026")?;
    ws.write_string(4, 1, "5/29/2026")?;
    ws.write_string(1, 17, "Welcome back!")?;
    ws.write_string(7, 14, "Tell us what you think")?;
    ws.write_string(7, 15, "https://example.org/suggest")?;
    ws.write_string(7, 0, "9/20/2025")?;
    ws.write_string(7, 1, "Fall Kickoff")?;
    ws.write_string(7, 2, "First event of the year")?;
    Ok(())
}

fn fill_subjects(ws: &mut Worksheet) -> Result<(), XlsxError> {
    ws.write_string(1, 16, "Math")?;
    ws.write_string(1, 17, "A2")?;
    ws.write_string(1, 18, "A3")?;
    ws.write_string(1, 19, "#FF0000")?;
    ws.write_string(1, 0, "Algebra I")?;
    ws.write_string(1, 1, "#AA0000")?;
    ws.write_string(2, 0, "Geometry")?;
    Ok(())
}

fn build(workbook: &mut Workbook) -> Vec<u8> {
    workbook.save_to_buffer().expect("save workbook")
}

#[test]
fn hours_bucket_by_semester_with_inclusive_starts() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    fill_information(workbook.worksheet_from_index(2).expect("sheet")).expect("information");
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let snapshot = &outcome.snapshot;

    assert_eq!(snapshot.semester1_start, Some(ymd(2025, 8, 1)));
    assert_eq!(snapshot.members.len(), 2);

    let smith = snapshot.member("A. Smith").expect("A. Smith");
    assert_eq!(smith.semester1_hours, 3.5);
    assert_eq!(smith.semester2_hours, 1.0);
    assert_eq!(smith.total_hours(), 4.5);
    // 2/1/2026 is on/after the semester-2 start, so it lands in semester 2.
    assert_eq!(smith.daily.len(), 3);

    let jones = snapshot.member("B. Jones").expect("B. Jones");
    assert_eq!(jones.semester1_hours, 3.0);
    assert_eq!(jones.semester2_hours, 0.0);
}

#[test]
fn additional_hours_merge_and_synthesize_missing_members() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    fill_information(workbook.worksheet_from_index(2).expect("sheet")).expect("information");
    {
        let ws = workbook.worksheet_from_index(1).expect("sheet");
        ws.write_string(4, 0, "A. Smith").expect("name");
        ws.write_string(4, 1, "10/4/2025").expect("date");
        ws.write_number(4, 2, 2.0).expect("hours");
        ws.write_string(4, 3, "Food drive").expect("notes");
        // Not on the primary sheet at all.
        ws.write_string(5, 0, "C. Wu").expect("name");
        ws.write_string(5, 1, "10/4/2025").expect("date");
        ws.write_number(5, 2, 1.0).expect("hours");
    }
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let snapshot = &outcome.snapshot;

    let smith = snapshot.member("A. Smith").expect("A. Smith");
    assert_eq!(smith.semester1_hours, 5.5);
    assert_eq!(smith.additional.len(), 1);
    assert_eq!(smith.additional[0].notes, "Food drive");

    let wu = snapshot.member("C. Wu").expect("synthesized member");
    assert_eq!(wu.semester1_hours, 1.0);
    assert!(wu.daily.is_empty());
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.message.contains("C. Wu")));
}

#[test]
fn missing_semester_start_zeroes_every_member() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    // Information sheet left blank: no semester boundaries at all.
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let smith = outcome.snapshot.member("A. Smith").expect("A. Smith");
    assert_eq!(smith.total_hours(), 0.0);
    assert!(smith.daily.is_empty());
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.message.contains("semester 1 start")));
}

#[test]
fn proficiencies_resolve_case_insensitively_across_subjects() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    fill_information(workbook.worksheet_from_index(2).expect("sheet")).expect("information");
    fill_subjects(workbook.worksheet_from_index(5).expect("sheet")).expect("subjects");
    {
        let ws = workbook.worksheet_from_index(4).expect("sheet");
        ws.write_string(5, 0, "A. Smith").expect("name");
        ws.write_string(5, 1, "ALGEBRA I").expect("course");
        ws.write_string(5, 2, "geometry").expect("course");
        ws.write_string(5, 3, "Pottery").expect("course");
    }
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let snapshot = &outcome.snapshot;

    assert_eq!(snapshot.subjects.len(), 1);
    assert_eq!(snapshot.subjects[0].courses.len(), 2);

    assert_eq!(snapshot.proficiencies.len(), 1);
    let prof = &snapshot.proficiencies[0];
    assert_eq!(prof.by_subject.len(), 1);
    assert_eq!(prof.by_subject[0].subject_id, "math");
    assert_eq!(prof.by_subject[0].count, 2);
    assert!(outcome
        .diagnostics
        .iter()
        .any(|d| d.message.contains("Pottery")));
}

#[test]
fn resources_and_meetings_round_out_the_snapshot() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    fill_information(workbook.worksheet_from_index(2).expect("sheet")).expect("information");
    fill_subjects(workbook.worksheet_from_index(5).expect("sheet")).expect("subjects");
    {
        let ws = workbook.worksheet_from_index(6).expect("sheet");
        ws.write_string(0, 1, "Video").expect("tag");
        ws.write_string(3, 1, "Khan Algebra").expect("name");
        ws.write_string(3, 4, "Algebra I").expect("course tag");
        ws.write_string(3, 5, "https://example.org").expect("link");
        ws.write_string(3, 6, "video").expect("general tag");
    }
    {
        let ws = workbook.worksheet_from_index(7).expect("sheet");
        ws.write_string(3, 1, "General Meeting").expect("title");
        ws.write_string(3, 2, "8/20/2025").expect("date");
        ws.write_string(3, 3, "7:30 AM").expect("start");
    }
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let snapshot = &outcome.snapshot;

    assert_eq!(snapshot.general_tags.len(), 1);
    assert_eq!(snapshot.resources.len(), 1);
    let resource = &snapshot.resources[0];
    assert_eq!(resource.courses[0].subject_id, "math");
    assert_eq!(resource.subjects[0].name, "Math");

    assert_eq!(snapshot.meetings.len(), 1);
    let meeting = &snapshot.meetings[0];
    assert_eq!(meeting.date, Some(ymd(2025, 8, 20)));
    assert_eq!(meeting.date_label, "20 August 2025");
    assert_eq!(meeting.start_time, "7:30 AM");
    assert_eq!(meeting.end_time, "N/A");
    assert_eq!(meeting.length, "N/A");
    assert_eq!(meeting.notes, "No notes for this meeting.");
}

#[test]
fn short_workbook_degrades_optional_sections_with_warnings() {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    fill_hour_tracker(ws).expect("hour tracker");
    let bytes = build(&mut workbook);

    let outcome = parse_workbook_bytes(&bytes).expect("parse");
    let snapshot = &outcome.snapshot;

    // No Information sheet: members exist but carry no hours.
    assert_eq!(snapshot.members.len(), 2);
    assert_eq!(snapshot.member("A. Smith").expect("member").total_hours(), 0.0);
    assert!(snapshot.officers.is_empty());
    assert!(snapshot.subjects.is_empty());
    assert!(snapshot.resources.is_empty());
    assert!(snapshot.meetings.is_empty());
    assert!(outcome.diagnostics.len() >= 6);
}

#[test]
fn blank_primary_sheet_is_a_fatal_error() {
    let bytes = build(&mut blank_workbook());
    match parse_workbook_bytes(&bytes) {
        Err(NormalizeError::MalformedPrimarySheet { name, .. }) => {
            assert_eq!(name, "HourTracker");
        }
        other => panic!("expected a malformed-sheet error, got {other:?}"),
    }
}

#[test]
fn parse_workbook_file_reads_from_disk() {
    let mut workbook = blank_workbook();
    fill_hour_tracker(workbook.worksheet_from_index(0).expect("sheet")).expect("hour tracker");
    fill_information(workbook.worksheet_from_index(2).expect("sheet")).expect("information");
    let bytes = build(&mut workbook);

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("chapter.xlsx");
    std::fs::write(&path, bytes).expect("write workbook");

    let outcome = parse_workbook_file(&path).expect("parse from disk");
    assert_eq!(outcome.snapshot.members.len(), 2);
}
