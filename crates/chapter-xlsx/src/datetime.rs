//! Date and time coercion for loosely-typed workbook cells.
//!
//! The workbook mixes serial date numbers with hand-typed `M/D/Y` text, and
//! meeting times appear both as day fractions and as pre-formatted strings.
//! Everything funnels through [`coerce_date`] / [`format_time`] so the
//! normalizer sees one representation.

use std::sync::OnceLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use chapter_model::CellScalar;

/// Workbook date system used to interpret serial date values.
///
/// Excel supports two base date systems:
/// - `Excel1900` (default on Windows; includes the Lotus 1-2-3 leap year bug)
/// - `Excel1904` (default on older Mac versions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateSystem {
    #[default]
    #[serde(rename = "excel1900")]
    Excel1900,
    #[serde(rename = "excel1904")]
    Excel1904,
}

/// Largest serial Excel itself can represent (9999-12-31 in the 1900 system).
const MAX_SERIAL_DAYS: i64 = 2_958_465;

/// Convert an Excel date serial to a calendar date. Invalid serials
/// (negative, non-finite, out of range) become `None`, never a panic.
pub fn serial_to_date(serial: f64, system: DateSystem) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor() as i64;
    if days > MAX_SERIAL_DAYS {
        return None;
    }
    let base = match system {
        DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
        // The 1900 system counts a phantom 1900-02-29 (serial 60); anchoring
        // serials below 60 one day later keeps real dates aligned on both
        // sides of the gap.
        DateSystem::Excel1900 if days < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        DateSystem::Excel1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    base.checked_add_signed(Duration::days(days))
}

fn date_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{2,4})").expect("date pattern compiles")
    })
}

/// Parse hand-typed date text: `M/D/Y` with `/`, `.` or `-` separators
/// anywhere in the string, then a few unambiguous fallbacks. Two-digit
/// years pivot at 50 (`< 50` is 2000s, `>= 50` is 1900s).
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = date_text_re().captures(text) {
        let month: Option<u32> = caps[1].parse().ok();
        let day: Option<u32> = caps[2].parse().ok();
        let year: Option<i32> = caps[3].parse().ok().map(|y: i32| {
            if y < 100 {
                y + if y < 50 { 2000 } else { 1900 }
            } else {
                y
            }
        });
        if let (Some(m), Some(d), Some(y)) = (month, day, year) {
            // An implausible M/D/Y match (e.g. the tail of an ISO date)
            // falls through to the format list below.
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    for format in ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

/// Normalize a cell into a date regardless of how the author typed it.
pub fn coerce_date(cell: &CellScalar, system: DateSystem) -> Option<NaiveDate> {
    match cell {
        CellScalar::Number(n) => serial_to_date(*n, system),
        CellScalar::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn time_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(?i)(am|pm)?$").expect("time pattern compiles")
    })
}

/// Format a meeting time cell as `h:mm AM/PM`.
///
/// Numbers must be day fractions (`0 <= t < 1`); text is re-rendered when it
/// looks like a clock time and passed through untouched otherwise. `None`
/// means the cell held nothing usable.
pub fn format_time(cell: &CellScalar) -> Option<String> {
    match cell {
        CellScalar::Number(n) if (0.0..1.0).contains(n) => {
            let total_minutes = (n * 24.0 * 60.0).round() as u32 % (24 * 60);
            Some(clock_label(total_minutes / 60, total_minutes % 60))
        }
        CellScalar::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            match time_text_re().captures(s) {
                Some(caps) => {
                    let hour: u32 = caps[1].parse().ok()?;
                    let minute: u32 = caps
                        .get(2)
                        .map_or(Some(0), |m| m.as_str().parse().ok())?;
                    let meridiem = caps.get(3).map(|m| m.as_str().to_ascii_lowercase());
                    let hour24 = match meridiem.as_deref() {
                        Some("am") => {
                            if hour == 12 {
                                0
                            } else {
                                hour
                            }
                        }
                        Some("pm") => {
                            if hour == 12 {
                                12
                            } else {
                                hour + 12
                            }
                        }
                        _ => hour,
                    };
                    if hour24 > 23 || minute > 59 {
                        return None;
                    }
                    Some(clock_label(hour24, minute))
                }
                // Already formatted some other way; trust the author.
                None => Some(s.to_string()),
            }
        }
        _ => None,
    }
}

fn clock_label(hour24: u32, minute: u32) -> String {
    let meridiem = if hour24 >= 12 { "PM" } else { "AM" };
    let hour = match hour24 % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{minute:02} {meridiem}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_dates_convert_in_both_systems() {
        // 45689 is 2025-02-01 in the 1900 system.
        assert_eq!(
            serial_to_date(45689.0, DateSystem::Excel1900),
            Some(ymd(2025, 2, 1))
        );
        assert_eq!(
            serial_to_date(44227.0, DateSystem::Excel1904),
            Some(ymd(2025, 2, 1))
        );
        // Serial 1 is 1900-01-01; the phantom leap day doesn't shift it.
        assert_eq!(
            serial_to_date(1.0, DateSystem::Excel1900),
            Some(ymd(1900, 1, 1))
        );
        assert_eq!(
            serial_to_date(61.0, DateSystem::Excel1900),
            Some(ymd(1900, 3, 1))
        );
    }

    #[test]
    fn invalid_serials_are_none_not_panics() {
        assert_eq!(serial_to_date(-3.0, DateSystem::Excel1900), None);
        assert_eq!(serial_to_date(f64::NAN, DateSystem::Excel1900), None);
        assert_eq!(serial_to_date(9e9, DateSystem::Excel1900), None);
    }

    #[test]
    fn text_dates_parse_with_mixed_separators() {
        assert_eq!(parse_date_text("2/1/2025"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("02.01.2025"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("2-1-2025"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("updated 2/1/2025 late"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("February 1, 2025"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("2025-08-25"), Some(ymd(2025, 8, 25)));
        assert_eq!(parse_date_text("not a date"), None);
    }

    #[test]
    fn two_digit_years_pivot_at_50() {
        assert_eq!(parse_date_text("2/1/25"), Some(ymd(2025, 2, 1)));
        assert_eq!(parse_date_text("2/1/49"), Some(ymd(2049, 2, 1)));
        assert_eq!(parse_date_text("2/1/50"), Some(ymd(1950, 2, 1)));
        assert_eq!(parse_date_text("2/1/99"), Some(ymd(1999, 2, 1)));
    }

    #[test]
    fn time_fractions_render_as_clock_labels() {
        assert_eq!(
            format_time(&CellScalar::Number(0.5)),
            Some("12:00 PM".to_string())
        );
        assert_eq!(
            format_time(&CellScalar::Number(0.614_583_333)),
            Some("2:45 PM".to_string())
        );
        assert_eq!(format_time(&CellScalar::Number(0.0)), Some("12:00 AM".to_string()));
        assert_eq!(format_time(&CellScalar::Number(1.5)), None);
    }

    #[test]
    fn time_text_is_normalized_or_passed_through() {
        assert_eq!(
            format_time(&CellScalar::Text("2:45pm".into())),
            Some("2:45 PM".to_string())
        );
        assert_eq!(
            format_time(&CellScalar::Text("14:45".into())),
            Some("2:45 PM".to_string())
        );
        assert_eq!(
            format_time(&CellScalar::Text("7 AM".into())),
            Some("7:00 AM".to_string())
        );
        assert_eq!(
            format_time(&CellScalar::Text("after school".into())),
            Some("after school".to_string())
        );
        assert_eq!(format_time(&CellScalar::Empty), None);
    }
}
