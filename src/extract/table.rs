use compact_str::CompactString;
use scraper::ElementRef;

use super::{Page, cells, days, rows, text};
use crate::{
    schedule::{RawSession, Schedule, SessionType},
    time,
};

const LAP_MARKERS: &[&str] = &["lap swim"];
const REC_MARKERS: &[&str] = &["rec swim", "recreational swim", "open swim", "family swim"];

/// Session type of one time cell.
///
/// Lap markers are checked before recreational ones, so a row mentioning both ends up
/// recreational.
pub fn classify(cell: &str, row: &str, default: SessionType) -> SessionType {
    let cell = cell.to_lowercase();
    let row = row.to_lowercase();
    let marked = |markers: &[&str]| {
        markers
            .iter()
            .any(|m| cell.contains(m) || row.contains(m))
    };

    let mut kind = default;
    if marked(LAP_MARKERS) {
        kind = SessionType::Lap;
    }
    if marked(REC_MARKERS) {
        kind = SessionType::Recreational;
    }
    kind
}

fn spans(cell: &str) -> Vec<&str> {
    let found: Vec<_> = time::ranges(cell).collect();
    if found.len() > 1 { found } else { vec![cell] }
}

fn row_sessions(row: ElementRef, default: SessionType) -> Vec<RawSession> {
    let texts: Vec<String> = cells(row).map(text).collect();
    if texts.len() < 2 {
        return Vec::new();
    }

    let mut day = None;
    let mut times = Vec::new();
    for content in &texts {
        if day.is_none() && days::is_day_cell(content) {
            day = Some(content.as_str());
        } else if time::has_time(content) {
            times.push(content.as_str());
        }
    }
    let Some(day) = day else {
        return Vec::new();
    };
    if times.is_empty() {
        return Vec::new();
    }

    let weekdays = days::resolve(day);
    if weekdays.is_empty() {
        tracing::debug!(target: "extract", "no weekday in {day:?}, dropping {times:?}");
        return Vec::new();
    }

    let row_text = text(row);
    let mut out = Vec::new();
    for cell in times {
        let kind = classify(cell, &row_text, default);
        for span in spans(cell) {
            out.extend(weekdays.iter().map(|weekday| RawSession {
                weekday: weekday.clone(),
                text: CompactString::from(span),
                kind,
            }));
        }
    }
    out
}

/// Reads a schedule table into a weekday mapping, `default` typing unmarked cells.
///
/// Rows without a weekday cell or a clock-time cell are skipped.
pub fn extract(table: ElementRef, default: SessionType) -> Schedule {
    let schedule = rows(table).fold(Schedule::new(), |mut schedule, row| {
        for raw in row_sessions(row, default) {
            schedule.push(raw);
        }
        schedule
    });
    tracing::debug!(target: "extract", "{} {default} entries", schedule.len());
    schedule
}

/// Reads `table` defaulting to the category of the heading above it, or recreational.
pub fn extract_combined(page: &Page, table: ElementRef) -> Schedule {
    let default = page
        .category_before(table)
        .unwrap_or(SessionType::Recreational);
    extract(table, default)
}
