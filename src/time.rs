use std::sync::LazyLock;

use chrono::{
    DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::{Captures, Regex};

/// Civil timezone the pool publishes its schedule in.
pub const SITE_TZ: Tz = chrono_tz::America::Los_Angeles;

static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d{1,2}:\d{2}\s*[ap]m").unwrap());

static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*([ap])m\s*[-–]\s*(\d{1,2}):(\d{2})\s*([ap])m").unwrap()
});

/// Whether `text` mentions at least one `H:MM(am|pm)` clock time.
pub fn has_time(text: &str) -> bool {
    TIME.is_match(text)
}

/// Every complete `H:MM(am|pm) - H:MM(am|pm)` range in `text`, left to right.
pub fn ranges(text: &str) -> impl Iterator<Item = &str> {
    RANGE.find_iter(text).map(|m| m.as_str())
}

fn clock(caps: &Captures, hour: usize, minute: usize, meridiem: usize) -> Option<NaiveTime> {
    let h: u32 = caps[hour].parse().ok()?;
    let m: u32 = caps[minute].parse().ok()?;
    if !(1..=12).contains(&h) {
        return None;
    }
    let pm = caps[meridiem].eq_ignore_ascii_case("p");
    let h = match (h, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Pins a wall-clock reading in [`SITE_TZ`] to an absolute instant.
///
/// The repeated hour when clocks fall back resolves to its first occurrence. A reading
/// inside the skipped hour when clocks spring forward is taken with the offset in force
/// just before the jump, which lands it one hour later on the new wall clock.
pub fn site_instant(local: NaiveDateTime) -> DateTime<Utc> {
    match SITE_TZ.from_local_datetime(&local) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
        LocalResult::None => {
            let offset = SITE_TZ.offset_from_utc_datetime(&local).fix();
            let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Parses a `H:MM(am|pm) - H:MM(am|pm)` range and anchors it to `date` in [`SITE_TZ`].
///
/// The end is taken on the same date as the start even when it reads earlier, so
/// `"11:00pm - 1:00am"` does not roll over midnight.
pub fn normalize(text: &str, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let caps = RANGE.captures(text)?;
    let start = clock(&caps, 1, 2, 3)?;
    let end = clock(&caps, 4, 5, 6)?;

    let start = site_instant(date.and_time(start));
    let end = site_instant(date.and_time(end));
    if end <= start {
        tracing::warn!(target: "time-converter", "{text:?} on {date}: end {end} is not after start {start}");
    }
    tracing::debug!(target: "time-converter", "{text:?} on {date} -> {start} .. {end}");

    Some((start, end))
}

pub fn site_today(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&SITE_TZ).date_naive()
}

/// Renders an instant as the site's own wall clock, e.g. `7:30am`.
pub fn site_clock(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&SITE_TZ).format("%-I:%M%P").to_string()
}
