pub mod aggregate;
pub mod api;
pub mod config;
pub mod extract;
pub mod schedule;
pub mod scrape;
pub mod time;
