use chrono::{Datelike, NaiveDate};

/// `MM/DD/YYYY`, the format used for ledger-entry date labels.
pub fn format_date_mdy(date: NaiveDate) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.month(),
        date.day(),
        date.year()
    )
}

/// `DD Month YYYY`, the format used for page-level labels (update stamps,
/// meeting dates, event dates).
pub fn format_date_long(date: NaiveDate) -> String {
    const MONTHS: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    format!(
        "{:02} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}
