use scraper::ElementRef;

use super::{Page, cells, days::is_day_cell, rows, text};
use crate::{schedule::SessionType, time::has_time};

type Strategy = for<'a> fn(&Page<'a>, SessionType) -> Option<ElementRef<'a>>;

const STRATEGIES: [(&str, Strategy); 4] = [
    ("exact heading", exact_heading),
    ("fuzzy heading", fuzzy_heading),
    ("proximity", proximity),
    ("structure", structural),
];

const fn exact_phrases(category: SessionType) -> &'static [&'static str] {
    match category {
        SessionType::Lap => &["Lap Swim Hours", "Lap Swim Schedule", "Lap Swim"],
        SessionType::Recreational => &[
            "Recreational Swim Hours",
            "Rec Swim Hours",
            "Recreational Swim Schedule",
            "Recreational Swim",
            "Open Swim Hours",
        ],
    }
}

const fn required_words(category: SessionType) -> &'static [&'static str] {
    match category {
        SessionType::Lap => &["lap", "swim"],
        SessionType::Recreational => &["rec", "swim"],
    }
}

fn fuzzy_match(heading: &str, category: SessionType) -> bool {
    let heading = heading.to_lowercase();
    required_words(category).iter().all(|w| heading.contains(w))
}

/// The schedule category a heading announces, lap taking precedence.
pub fn heading_category(heading: &str) -> Option<SessionType> {
    [SessionType::Lap, SessionType::Recreational]
        .into_iter()
        .find(|&category| fuzzy_match(heading, category))
}

/// First table after the heading at `index`, up to the next heading of the same level.
fn table_after<'a>(page: &Page<'a>, index: usize) -> Option<ElementRef<'a>> {
    let elements = page.elements();
    let level = elements[index].value().name();
    elements[index + 1..]
        .iter()
        .take_while(|e| e.value().name() != level)
        .find(|e| e.value().name() == "table")
        .copied()
}

fn exact_heading<'a>(page: &Page<'a>, category: SessionType) -> Option<ElementRef<'a>> {
    let phrases = exact_phrases(category);
    page.headings()
        .filter(|(_, h)| phrases.contains(&text(*h).as_str()))
        .find_map(|(i, _)| table_after(page, i))
}

fn fuzzy_heading<'a>(page: &Page<'a>, category: SessionType) -> Option<ElementRef<'a>> {
    page.headings()
        .filter(|(_, h)| fuzzy_match(&text(*h), category))
        .find_map(|(i, _)| table_after(page, i))
}

fn mentions(element: Option<ElementRef>, needle: &str) -> bool {
    element.is_some_and(|e| text(e).to_lowercase().contains(needle))
}

fn proximity<'a>(page: &Page<'a>, category: SessionType) -> Option<ElementRef<'a>> {
    if category != SessionType::Lap {
        return None;
    }
    page.tables().find(|&table| {
        mentions(Some(table), "lap")
            || mentions(table.prev_siblings().find_map(ElementRef::wrap), "lap")
            || mentions(table.next_siblings().find_map(ElementRef::wrap), "lap")
    })
}

/// Whether a table has at least one weekday cell and one clock-time cell.
pub fn looks_like_schedule(table: ElementRef) -> bool {
    let (mut day, mut time) = (false, false);
    for cell in rows(table).flat_map(cells) {
        let content = text(cell);
        day |= is_day_cell(&content);
        time |= has_time(&content);
        if day && time {
            return true;
        }
    }
    false
}

fn structural<'a>(page: &Page<'a>, _: SessionType) -> Option<ElementRef<'a>> {
    page.tables().find(|&table| looks_like_schedule(table))
}

/// Best guess at the table holding the `category` schedule.
pub fn locate<'a>(page: &Page<'a>, category: SessionType) -> Option<ElementRef<'a>> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let table = strategy(page, category)?;
        tracing::debug!(target: "locate", "{category} table found by {name}");
        Some(table)
    })
}
