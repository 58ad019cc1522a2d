use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which semester a dated entry was bucketed into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
    First,
    Second,
}

impl Semester {
    pub const fn number(self) -> u8 {
        match self {
            Semester::First => 1,
            Semester::Second => 2,
        }
    }
}

/// Morning or afternoon tutoring slot on the hour tracker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Am,
    Pm,
}

/// One recorded tutoring slot from the primary hour sheet. Only slots with
/// hours > 0 are recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyHourEntry {
    pub date: NaiveDate,
    pub session: Session,
    pub hours: f64,
    pub semester: Semester,
}

/// One out-of-band entry from the supplemental hours sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdditionalHourEntry {
    pub date: NaiveDate,
    pub hours: f64,
    pub notes: String,
    pub semester: Semester,
}

/// One member's hour ledger. The member name is the unique key across every
/// sheet that mentions members.
///
/// Semester buckets accumulate as entries are recorded; the total is always
/// derived from the buckets (see [`Member::total_hours`]) so it can never
/// drift from the entries that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub semester1_hours: f64,
    pub semester2_hours: f64,
    pub daily: Vec<DailyHourEntry>,
    pub additional: Vec<AdditionalHourEntry>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semester1_hours: 0.0,
            semester2_hours: 0.0,
            daily: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Total hours, always `semester1 + semester2`.
    pub fn total_hours(&self) -> f64 {
        self.semester1_hours + self.semester2_hours
    }
}

/// A course inside a subject. The color is a normalized `#RRGGBB`/`#RGB`
/// uppercase hex string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub color: String,
}

/// A subject grouping an ordered list of courses, with a case-insensitive
/// course-name lookup consulted by every later resolution step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub color: String,
    pub courses: Vec<Course>,
    #[serde(skip)]
    lookup: HashMap<String, usize>,
}

impl Subject {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: slug_id(&name),
            name,
            color: color.into(),
            courses: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Append a course and index it for case-insensitive lookup. When two
    /// courses share a name modulo case, the later one wins the lookup (both
    /// remain in `courses`).
    pub fn add_course(&mut self, course: Course) {
        self.lookup
            .insert(course.name.to_lowercase(), self.courses.len());
        self.courses.push(course);
    }

    /// Case-insensitive course lookup.
    pub fn course(&self, name: &str) -> Option<&Course> {
        let key = name.trim().to_lowercase();
        if let Some(&idx) = self.lookup.get(&key) {
            return Some(&self.courses[idx]);
        }
        // serde skips the lookup, so deserialized subjects fall back to a
        // scan (last match wins, same as the indexed path).
        if self.lookup.is_empty() {
            return self.courses.iter().rev().find(|c| c.name.to_lowercase() == key);
        }
        None
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        // The lookup is derived from `courses`; comparing it would be noise.
        self.id == other.id
            && self.name == other.name
            && self.color == other.color
            && self.courses == other.courses
    }
}

/// A member's matched courses within one subject.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectProficiency {
    pub subject_id: String,
    pub subject_name: String,
    pub subject_color: String,
    pub courses: Vec<Course>,
    pub count: usize,
}

/// Per-member proficiency aggregation derived from free-text course names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberProficiency {
    pub id: String,
    pub name: String,
    pub by_subject: Vec<SubjectProficiency>,
}

/// A descriptive tag from the fixed catalog in the study-resources header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralTag {
    pub id: String,
    pub name: String,
}

/// A subject tag attached to a study resource.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSubject {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// A course tag attached to a study resource, carrying its owning subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCourse {
    pub name: String,
    pub color: String,
    pub subject_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudyResource {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: Option<String>,
    pub subjects: Vec<ResourceSubject>,
    pub courses: Vec<ResourceCourse>,
    pub general_tags: Vec<GeneralTag>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    /// `None` when the sheet's date cell could not be parsed.
    pub date: Option<NaiveDate>,
    pub date_label: String,
    pub start_time: String,
    pub end_time: String,
    pub length: String,
    pub notes: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
    pub description: String,
    /// A `data:image/...` URI, never empty (a transparent pixel stands in
    /// when the sheet has no portrait).
    pub image: String,
    pub secondary_image: Option<String>,
}

/// An upcoming-event row from the Information sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    pub date_label: String,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkItem {
    pub id: String,
    pub text: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub id: String,
    pub date_label: String,
    pub header: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangelogItem {
    pub id: String,
    pub date_label: String,
    pub content: String,
}

/// The complete, immutable output of one workbook parse.
///
/// Sections backed by optional sheets are empty (not absent) when their
/// sheet is missing; scalar metadata degrades to `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub website_last_updated: Option<String>,
    pub hours_last_updated: Option<String>,
    pub semester1_start: Option<NaiveDate>,
    pub semester2_start: Option<NaiveDate>,
    pub semester2_end: Option<NaiveDate>,

    pub splash_texts: Vec<String>,
    pub upcoming_events: Vec<EventItem>,
    pub links: Vec<LinkItem>,
    pub info_updates: Vec<UpdateItem>,
    pub changelog: Vec<ChangelogItem>,
    pub suggestions_text: Option<String>,
    pub suggestions_url: Option<String>,

    pub members: Vec<Member>,
    pub officers: Vec<Officer>,
    pub subjects: Vec<Subject>,
    pub proficiencies: Vec<MemberProficiency>,
    pub general_tags: Vec<GeneralTag>,
    pub resources: Vec<StudyResource>,
    pub meetings: Vec<Meeting>,
}

impl Snapshot {
    /// Look up a member by exact name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Resolve a course name case-insensitively across all subjects, in
    /// subject order. The first subject containing the course wins.
    pub fn resolve_course(&self, name: &str) -> Option<(&Subject, &Course)> {
        resolve_course(&self.subjects, name)
    }
}

/// Resolve a course name against a subject list; see
/// [`Snapshot::resolve_course`].
pub fn resolve_course<'a>(
    subjects: &'a [Subject],
    name: &str,
) -> Option<(&'a Subject, &'a Course)> {
    subjects.iter().find_map(|s| s.course(name).map(|c| (s, c)))
}

/// Derive a stable slug id from a display name: lowercase, whitespace runs
/// become `-`, and anything outside `[a-z0-9-]` is dropped.
pub fn slug_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_dash = !out.is_empty();
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '-' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slug_ids_are_stable() {
        assert_eq!(slug_id("Computer Science"), "computer-science");
        assert_eq!(slug_id("  AP  Calculus BC "), "ap-calculus-bc");
        assert_eq!(slug_id("Math & Stats!"), "math-stats");
    }

    #[test]
    fn total_hours_is_always_the_bucket_sum() {
        let mut m = Member::new("A. Smith");
        m.semester1_hours = 2.5;
        m.semester2_hours = 1.0;
        assert_eq!(m.total_hours(), 3.5);
    }

    #[test]
    fn course_lookup_ignores_case() {
        let mut subject = Subject::new("Science", "#FF0000");
        subject.add_course(Course {
            name: "Biology".into(),
            color: "#00FF00".into(),
        });

        assert_eq!(subject.course("bIoLoGy").unwrap().name, "Biology");
        assert_eq!(subject.course(" biology ").unwrap().name, "Biology");
        assert!(subject.course("Chemistry").is_none());
    }

    #[test]
    fn resolve_course_prefers_earlier_subjects() {
        let mut first = Subject::new("Math", "#111111");
        first.add_course(Course {
            name: "Stats".into(),
            color: "#222222".into(),
        });
        let mut second = Subject::new("Science", "#333333");
        second.add_course(Course {
            name: "Stats".into(),
            color: "#444444".into(),
        });

        let snapshot = Snapshot {
            subjects: vec![first, second],
            ..Snapshot::default()
        };
        let (subject, course) = snapshot.resolve_course("stats").unwrap();
        assert_eq!(subject.id, "math");
        assert_eq!(course.color, "#222222");
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = Snapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
