//! Date/time formatting for the live clock and print stamps.

use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::Display;

/// How often the live clock refreshes.
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

/// Long weekday, day, long month, year: "Thursday 15 October 2026".
pub fn format_date<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%A %-d %B %Y").to_string()
}

/// Hour, minute, second on a 12-hour clock: "2:05:09 PM".
pub fn format_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%-I:%M:%S %p").to_string()
}

/// Date and time joined for print stamps.
pub fn format_full_datetime<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{} – {}", format_date(t), format_time(t))
}

pub fn current_year<Tz: TimeZone>(t: &DateTime<Tz>) -> i32 {
    t.year()
}

/// The two live display fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clock {
    pub date: String,
    pub time: String,
}

impl Clock {
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>)
    where
        Tz::Offset: Display,
    {
        self.date = format_date(now);
        self.time = format_time(now);
    }
}
