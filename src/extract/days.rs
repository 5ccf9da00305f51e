use chrono::Weekday;
use compact_str::CompactString;

use crate::schedule::weekday_name;

const PREFIXES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Whether a cell opens with a weekday, abbreviated or spelled out.
pub fn is_day_cell(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    PREFIXES.iter().any(|p| text.starts_with(p))
}

fn leading_word(token: &str) -> &str {
    token
        .trim()
        .split(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default()
}

pub fn parse_day(token: &str) -> Option<Weekday> {
    Some(match leading_word(token).to_lowercase().as_str() {
        "mon" | "monday" => Weekday::Mon,
        "tue" | "tues" | "tuesday" => Weekday::Tue,
        "wed" | "weds" | "wednesday" => Weekday::Wed,
        "thu" | "thur" | "thurs" | "thursday" => Weekday::Thu,
        "fri" | "friday" => Weekday::Fri,
        "sat" | "saturday" => Weekday::Sat,
        "sun" | "sunday" => Weekday::Sun,
        _ => return None,
    })
}

fn name(day: Weekday) -> CompactString {
    CompactString::const_new(weekday_name(day))
}

fn expand(start: &str, end: &str) -> Vec<CompactString> {
    let (Some(first), Some(last)) = (parse_day(start), parse_day(end)) else {
        return vec![start.trim().into(), end.trim().into()];
    };

    let (from, to) = (first.num_days_from_monday(), last.num_days_from_monday());
    if to < from {
        return vec![name(first), name(last)];
    }

    let mut day = first;
    let mut days = Vec::with_capacity((to - from + 1) as usize);
    loop {
        days.push(name(day));
        if day == last {
            break days;
        }
        day = day.succ();
    }
}

/// Resolves a day cell into the weekday names it covers.
///
/// `"Mon-Fri"` is an inclusive range. A range running backwards (`"Fri-Mon"`) yields just
/// its two endpoints, and one whose endpoints are not weekdays yields the endpoint text
/// as written. Anything else is a `/` separated list in which unknown names are dropped.
pub fn resolve(text: &str) -> Vec<CompactString> {
    let text = text.trim();
    if text.contains(['-', '–']) {
        let mut parts = text.split(['-', '–']);
        let start = parts.next().unwrap_or_default();
        let end = parts.next().unwrap_or_default();
        return expand(start, end);
    }

    text.split(['/', '-'])
        .filter_map(parse_day)
        .map(name)
        .collect()
}
