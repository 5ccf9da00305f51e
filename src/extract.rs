pub mod days;
pub mod locate;
pub mod table;

use scraper::{ElementRef, Html};

use crate::schedule::{Schedule, SessionType};

/// A parsed document with its elements indexed in document order.
pub struct Page<'a> {
    elements: Vec<ElementRef<'a>>,
}

impl<'a> Page<'a> {
    pub fn new(html: &'a Html) -> Self {
        let elements = html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect();
        Self { elements }
    }

    pub fn elements(&self) -> &[ElementRef<'a>] {
        &self.elements
    }

    pub fn position(&self, element: ElementRef<'a>) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == element.id())
    }

    pub fn tables(&self) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        self.elements.iter().copied().filter(|e| e.value().name() == "table")
    }

    pub fn headings(&self) -> impl Iterator<Item = (usize, ElementRef<'a>)> + '_ {
        self.elements
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, e)| is_heading(e))
    }

    /// Category of the closest schedule heading before `element`, if any.
    pub fn category_before(&self, element: ElementRef<'a>) -> Option<SessionType> {
        let end = self.position(element)?;
        self.elements[..end]
            .iter()
            .rev()
            .filter(|e| is_heading(e))
            .find_map(|h| locate::heading_category(&text(*h)))
    }
}

pub fn is_heading(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

/// Text content with runs of whitespace collapsed to one space.
pub fn text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
}

pub fn cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    row.child_elements()
        .filter(|e| matches!(e.value().name(), "td" | "th"))
}

/// Extracts both categories from a page.
///
/// Each category's table is read with that category as the default type. When both
/// lookups settle on the same table it is read once, defaulting to the category of the
/// heading above it.
pub fn schedule(page: &Page) -> Schedule {
    let lap = locate::locate(page, SessionType::Lap);
    let rec = locate::locate(page, SessionType::Recreational);

    match (lap, rec) {
        (Some(lap), Some(rec)) if lap.id() == rec.id() => {
            tracing::debug!(target: "extract", "one table holds both categories");
            table::extract_combined(page, lap)
        }
        (lap, rec) => {
            let mut schedule = Schedule::new();
            if let Some(lap) = lap {
                schedule.extend(table::extract(lap, SessionType::Lap));
            } else {
                tracing::info!(target: "extract", "no lap swim table found");
            }
            if let Some(rec) = rec {
                schedule.extend(table::extract(rec, SessionType::Recreational));
            } else {
                tracing::info!(target: "extract", "no recreational swim table found");
            }
            schedule
        }
    }
}
