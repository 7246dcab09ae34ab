use chrono::{NaiveDate, NaiveDateTime};

/// Day-first layouts tried in order; ISO goes first since it is unambiguous.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Two-digit year layouts, only tried when the year part is two digits long.
const SHORT_YEAR_FORMATS: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y"];

/// A parsed cell: calendar dates keep no time part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ParsedDate {
    /// ISO rendering the spreadsheet recognises as a date when user-entered.
    pub fn to_iso(&self) -> String {
        match self {
            ParsedDate::Date(d) => d.format("%Y-%m-%d").to_string(),
            ParsedDate::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Parse `"01/02/2024"` as 1 February 2024.
pub fn parse_day_first(s: &str) -> Option<ParsedDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ParsedDate::DateTime(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            // %Y happily takes "24" as year 24
            if has_four_digit_year(s) {
                return Some(ParsedDate::Date(d));
            }
        }
    }
    if !has_four_digit_year(s) {
        for fmt in SHORT_YEAR_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(ParsedDate::Date(d));
            }
        }
    }
    None
}

fn has_four_digit_year(s: &str) -> bool {
    s.split(|c: char| !c.is_ascii_digit())
        .any(|part| part.len() == 4)
}
