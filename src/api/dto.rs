use chrono::{DateTime, NaiveDate, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::{
    schedule::{DayResult, NormalizedSession, SessionType, WeekResult},
    time::SITE_TZ,
};

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekQuery {
    pub week_offset: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hours {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: CompactString,
    pub original: CompactString,
    #[serde(rename = "type")]
    pub kind: SessionType,
}

impl From<NormalizedSession> for Hours {
    fn from(session: NormalizedSession) -> Self {
        Self {
            start: session.start,
            end: session.end,
            timezone: SITE_TZ.name().into(),
            original: session.source_text,
            kind: session.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResponse {
    pub hours: Vec<Hours>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub day_name: CompactString,
    pub is_open_now: bool,
}

impl DayResponse {
    /// A day that fetched fine but has no sessions gets an informational error.
    pub fn new(day: DayResult, timestamp: DateTime<Utc>) -> Self {
        let error = day.error.or_else(|| {
            day.sessions
                .is_empty()
                .then(|| format!("No pool hours found for {}.", day.weekday_name))
        });
        Self {
            hours: day.sessions.into_iter().map(Hours::from).collect(),
            error,
            timestamp,
            date: day.date,
            day_name: day.weekday_name.into(),
            is_open_now: day.is_open_now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    pub date: NaiveDate,
    pub day_name: CompactString,
    pub hours: Vec<Hours>,
    pub error: Option<String>,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekResponse {
    pub week_data: Vec<WeekDay>,
    pub week_start_date: NaiveDate,
    pub week_end_date: NaiveDate,
    pub week_offset: i64,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl WeekResponse {
    pub fn new(week: WeekResult, week_offset: i64, timestamp: DateTime<Utc>) -> Self {
        let today = week.today;
        Self {
            week_data: week
                .days
                .into_iter()
                .map(|day| WeekDay {
                    date: day.date,
                    day_name: day.weekday_name.into(),
                    hours: day.sessions.into_iter().map(Hours::from).collect(),
                    error: day.error,
                    is_today: day.date == today,
                })
                .collect(),
            week_start_date: week.week_start,
            week_end_date: week.week_end,
            week_offset,
            error: week.error,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: CompactString,
    pub timestamp: DateTime<Utc>,
}
