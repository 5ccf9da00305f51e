use core::fmt;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use compact_str::CompactString;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Lap,
    Recreational,
}

impl SessionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lap => "lap",
            Self::Recreational => "recreational",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One time span read out of a schedule table, before it is pinned to a date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSession {
    pub weekday: CompactString,
    pub text: CompactString,
    pub kind: SessionType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub text: CompactString,
    pub kind: SessionType,
}

/// Weekday name to the time ranges listed for it, in table order.
///
/// Keys are full English names (`"Monday"`). A day range whose endpoints are not
/// recognizable weekdays keeps the endpoint text verbatim as its key, so such entries
/// never match a [`Weekday`] lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    days: HashMap<CompactString, Vec<ScheduleEntry>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, raw: RawSession) {
        let RawSession { weekday, text, kind } = raw;
        self.days
            .entry(weekday)
            .or_default()
            .push(ScheduleEntry { text, kind });
    }

    /// Appends every entry of `other` after the entries already present.
    pub fn extend(&mut self, other: Self) {
        for (day, entries) in other.days {
            self.days.entry(day).or_default().extend(entries);
        }
    }

    pub fn get(&self, weekday: Weekday) -> &[ScheduleEntry] {
        self.get_named(weekday_name(weekday))
    }

    pub fn get_named(&self, name: &str) -> &[ScheduleEntry] {
        self.days.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    /// Number of entries across all days.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedSession {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub kind: SessionType,
    pub source_text: CompactString,
}

impl NormalizedSession {
    /// Inclusive on both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayResult {
    pub date: NaiveDate,
    pub weekday_name: &'static str,
    pub sessions: Vec<NormalizedSession>,
    pub is_open_now: bool,
    pub error: Option<String>,
}

impl DayResult {
    pub fn failed(date: NaiveDate, error: String) -> Self {
        use chrono::Datelike;

        Self {
            date,
            weekday_name: weekday_name(date.weekday()),
            sessions: Vec::new(),
            is_open_now: false,
            error: Some(error),
        }
    }

    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeekResult {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Today's date in the timezone the week was requested in.
    pub today: NaiveDate,
    pub days: Vec<DayResult>,
    pub error: Option<String>,
}
