// src/annotate.rs

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// `"Updated at: 19/10/2026 07:05:09"`
pub fn updated_at<Tz>(label: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}", label, at.format(TIMESTAMP_FORMAT))
}
