use chrono::{DateTime, Datelike, Days, DurationRound, NaiveDate, TimeDelta, Utc, Weekday};
use chrono_tz::Tz;
use futures_util::future::join_all;
use scraper::Html;

use crate::{
    extract::{self, Page},
    schedule::{DayResult, NormalizedSession, Schedule, WeekResult, weekday_name},
    scrape::PageSource,
    time,
};

pub const ALL_DAYS_FAILED: &str = "Unable to load pool hours for any day this week.";
pub const NO_WEEK_DATA: &str = "No pool hours found for this week.";

/// Sessions listed for `date`'s weekday, pinned to `date` and sorted by start.
///
/// Entries whose text holds no usable time range are dropped.
pub fn sessions_on(schedule: &Schedule, date: NaiveDate) -> Vec<NormalizedSession> {
    let mut sessions: Vec<_> = schedule
        .get(date.weekday())
        .iter()
        .filter_map(|entry| {
            let Some((start, end)) = time::normalize(&entry.text, date) else {
                tracing::debug!(target: "day", "unparseable hours {:?}", entry.text);
                return None;
            };
            Some(NormalizedSession {
                start,
                end,
                kind: entry.kind,
                source_text: entry.text.clone(),
            })
        })
        .collect();
    sessions.sort_by_key(|s| s.start);
    sessions
}

/// Whether the pool is in session at `now`. Only meaningful for the site's current day.
pub fn is_open_now(sessions: &[NormalizedSession], date: NaiveDate, now: DateTime<Utc>) -> bool {
    if time::site_today(now) != date {
        return false;
    }
    let minute = now.duration_trunc(TimeDelta::minutes(1)).unwrap_or(now);
    sessions.iter().any(|s| s.contains(minute))
}

pub fn day_from_schedule(schedule: &Schedule, date: NaiveDate, now: DateTime<Utc>) -> DayResult {
    let sessions = sessions_on(schedule, date);
    DayResult {
        date,
        weekday_name: weekday_name(date.weekday()),
        is_open_now: is_open_now(&sessions, date, now),
        sessions,
        error: None,
    }
}

pub fn day_from_html(html: &str, date: NaiveDate, now: DateTime<Utc>) -> DayResult {
    let document = Html::parse_document(html);
    let schedule = extract::schedule(&Page::new(&document));
    day_from_schedule(&schedule, date, now)
}

/// Fetches the schedule page and builds the result for `date`.
///
/// A failed fetch is carried in [`DayResult::error`] rather than returned.
pub async fn fetch_day<S>(source: &S, date: NaiveDate, now: DateTime<Utc>) -> DayResult
where
    S: PageSource + Sync,
{
    match source.fetch_page().await {
        Ok(html) => {
            let day = day_from_html(&html, date, now);
            tracing::info!(target: "day", "{date}: {} sessions", day.sessions.len());
            day
        }
        Err(e) => {
            tracing::warn!(target: "day", "\x1b[31m{date}: {e}\x1b[0m");
            DayResult::failed(date, e.to_string())
        }
    }
}

/// Monday of the week `offset` weeks away from the one containing `today`.
pub fn week_start(today: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let back = match today.weekday() {
        Weekday::Sun => 6,
        other => other.num_days_from_monday(),
    };
    let monday = today.checked_sub_days(Days::new(u64::from(back)))?;
    monday.checked_add_signed(TimeDelta::try_days(offset.checked_mul(7)?)?)
}

fn week_error(days: &[DayResult]) -> Option<String> {
    if days.iter().all(DayResult::is_failed) {
        Some(ALL_DAYS_FAILED.to_owned())
    } else if days.iter().all(|d| !d.is_failed() && d.sessions.is_empty()) {
        Some(NO_WEEK_DATA.to_owned())
    } else {
        None
    }
}

/// Builds the Monday-to-Sunday week `offset` weeks from the current one.
///
/// "Current" and "today" are taken in `client_tz`; session times stay in the site's own
/// timezone. Each day fetches the page on its own and all seven run at once, so one
/// failing day leaves the others intact. Returns `None` when the week falls outside the
/// representable calendar.
pub async fn fetch_week<S>(
    source: &S,
    offset: i64,
    client_tz: Tz,
    now: DateTime<Utc>,
) -> Option<WeekResult>
where
    S: PageSource + Sync,
{
    let today = now.with_timezone(&client_tz).date_naive();
    let monday = week_start(today, offset)?;
    let dates = (0..7)
        .map(|i| monday.checked_add_days(Days::new(i)))
        .collect::<Option<Vec<_>>>()?;

    let days = join_all(dates.iter().map(|&date| fetch_day(source, date, now))).await;
    let error = week_error(&days);
    if let Some(error) = &error {
        tracing::warn!(target: "week", "week of {monday}: {error}");
    }

    Some(WeekResult {
        week_start: monday,
        week_end: dates[6],
        today,
        days,
        error,
    })
}

#[cfg(test)]
mod tests {
    use core::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use tokio::sync::Barrier;

    use super::*;
    use crate::{schedule::SessionType, scrape::FetchError};

    const PAGE: &str = r"
        <h2>Lap Swim Hours</h2>
        <table>
          <tr><td>Mon-Fri</td><td>7:30am - 11:00am</td></tr>
          <tr><td>Wednesday</td><td>7:00am</td></tr>
        </table>
        <h2>Recreational Swim Hours</h2>
        <table>
          <tr><td>Monday</td><td>1:00pm - 3:00pm</td><td>6:00am - 7:30am</td></tr>
        </table>";

    struct StaticPage(Result<String, FetchError>);

    impl PageSource for StaticPage {
        async fn fetch_page(&self) -> Result<String, FetchError> {
            self.0.clone()
        }
    }

    /// Fails every other request.
    struct Flaky(AtomicUsize);

    impl PageSource for Flaky {
        async fn fetch_page(&self) -> Result<String, FetchError> {
            if self.0.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(FetchError::Timeout)
            } else {
                Ok(PAGE.to_owned())
            }
        }
    }

    /// Only answers once seven requests are waiting at the same time.
    struct Gathering(Barrier);

    impl PageSource for Gathering {
        async fn fetch_page(&self) -> Result<String, FetchError> {
            self.0.wait().await;
            Ok(PAGE.to_owned())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn la() -> Tz {
        time::SITE_TZ
    }

    #[test]
    fn day_sessions_are_merged_and_sorted() {
        let day = day_from_html(PAGE, date(2024, 1, 15), utc("2024-01-10T00:00:00Z"));
        assert_eq!(day.weekday_name, "Monday");
        assert_eq!(day.error, None);

        let summary: Vec<_> = day
            .sessions
            .iter()
            .map(|s| (time::site_clock(s.start), s.kind))
            .collect();
        assert_eq!(
            summary,
            [
                ("6:00am".to_owned(), SessionType::Recreational),
                ("7:30am".to_owned(), SessionType::Lap),
                ("1:00pm".to_owned(), SessionType::Recreational),
            ]
        );
        assert_eq!(day.sessions[1].start, utc("2024-01-15T15:30:00Z"));
        assert_eq!(day.sessions[1].source_text, "7:30am - 11:00am");
    }

    #[test]
    fn ties_keep_table_order() {
        let page = r"
            <h2>Lap Swim Hours</h2>
            <table><tr><td>Tue</td><td>9:00am - 10:00am</td></tr></table>
            <h2>Rec Swim Hours</h2>
            <table><tr><td>Tue</td><td>9:00am - 11:00am</td></tr></table>";
        let day = day_from_html(page, date(2024, 1, 16), utc("2024-01-10T00:00:00Z"));
        let kinds: Vec<_> = day.sessions.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, [SessionType::Lap, SessionType::Recreational]);
    }

    #[test]
    fn unparseable_hours_are_dropped() {
        let day = day_from_html(PAGE, date(2024, 1, 17), utc("2024-01-10T00:00:00Z"));
        assert_eq!(day.sessions.len(), 1);
        assert_eq!(day.sessions[0].source_text, "7:30am - 11:00am");
    }

    #[test]
    fn weekend_without_sessions_is_empty_not_failed() {
        let day = day_from_html(PAGE, date(2024, 1, 20), utc("2024-01-10T00:00:00Z"));
        assert!(day.sessions.is_empty());
        assert!(!day.is_failed());
        assert!(!day.is_open_now);
    }

    #[test]
    fn open_now_only_on_the_site_today() {
        // 8:00am Monday in Los Angeles, inside the lap session.
        let now = utc("2024-01-15T16:00:00Z");
        assert!(day_from_html(PAGE, date(2024, 1, 15), now).is_open_now);
        assert!(!day_from_html(PAGE, date(2024, 1, 22), now).is_open_now);
        assert!(!day_from_html(PAGE, date(2024, 1, 16), now).is_open_now);
    }

    #[test]
    fn open_now_is_inclusive_to_the_minute() {
        let day = date(2024, 1, 15);
        // 11:00:30am, the lap session's final minute.
        assert!(day_from_html(PAGE, day, utc("2024-01-15T19:00:30Z")).is_open_now);
        // 11:01am, between sessions.
        assert!(!day_from_html(PAGE, day, utc("2024-01-15T19:01:00Z")).is_open_now);
    }

    #[test]
    fn site_today_decides_open_now_not_utc_date() {
        // 02:00Z on the 16th is 6:00pm on the 15th in Los Angeles.
        let now = utc("2024-01-16T02:00:00Z");
        let evening = r"
            <h2>Rec Swim Hours</h2>
            <table><tr><td>Mon</td><td>5:00pm - 7:00pm</td></tr></table>";
        assert!(day_from_html(evening, date(2024, 1, 15), now).is_open_now);
    }

    #[tokio::test]
    async fn transport_failure_becomes_day_error() {
        let source = StaticPage(Err(FetchError::ConnectionRefused));
        let day = fetch_day(&source, date(2024, 1, 15), utc("2024-01-15T16:00:00Z")).await;
        assert!(day.sessions.is_empty());
        assert!(!day.is_open_now);
        assert_eq!(day.error, Some(FetchError::ConnectionRefused.to_string()));
    }

    #[test]
    fn week_starts_on_monday() {
        assert_eq!(week_start(date(2024, 1, 17), 0), Some(date(2024, 1, 15)));
        assert_eq!(week_start(date(2024, 1, 15), 0), Some(date(2024, 1, 15)));
        assert_eq!(week_start(date(2024, 1, 21), 0), Some(date(2024, 1, 15)));
        assert_eq!(week_start(date(2024, 1, 17), 1), Some(date(2024, 1, 22)));
        assert_eq!(week_start(date(2024, 1, 17), -1), Some(date(2024, 1, 8)));
        assert_eq!(week_start(date(2024, 1, 17), i64::MAX), None);
    }

    #[tokio::test]
    async fn week_of_a_wednesday() {
        let source = StaticPage(Ok(PAGE.to_owned()));
        let week = fetch_week(&source, 0, la(), utc("2024-01-17T20:00:00Z"))
            .await
            .unwrap();

        assert_eq!(week.week_start, date(2024, 1, 15));
        assert_eq!(week.week_end, date(2024, 1, 21));
        assert_eq!(week.today, date(2024, 1, 17));
        assert_eq!(week.error, None);
        assert_eq!(week.days.len(), 7);
        for (i, day) in week.days.iter().enumerate() {
            assert_eq!(day.date, date(2024, 1, 15 + i as u32));
        }
        assert_eq!(week.days[0].sessions.len(), 3);
        assert_eq!(week.days[6].weekday_name, "Sunday");
    }

    #[tokio::test]
    async fn every_offset_spans_monday_to_sunday() {
        let source = StaticPage(Ok(PAGE.to_owned()));
        for offset in -6..=6 {
            let week = fetch_week(&source, offset, la(), utc("2024-03-10T12:00:00Z"))
                .await
                .unwrap();
            assert_eq!(week.days.len(), 7);
            assert_eq!(week.days[0].date.weekday(), Weekday::Mon);
            assert_eq!(week.days[6].date.weekday(), Weekday::Sun);
            assert_eq!(week.days[6].date, week.days[0].date + Days::new(6));
        }
    }

    #[tokio::test]
    async fn client_timezone_picks_the_week() {
        let source = StaticPage(Ok(PAGE.to_owned()));
        // Sunday evening in Los Angeles, Monday morning in Tokyo.
        let now = utc("2024-01-22T02:00:00Z");

        let pacific = fetch_week(&source, 0, la(), now).await.unwrap();
        assert_eq!(pacific.week_start, date(2024, 1, 15));
        assert_eq!(pacific.today, date(2024, 1, 21));

        let tokyo = fetch_week(&source, 0, chrono_tz::Asia::Tokyo, now).await.unwrap();
        assert_eq!(tokyo.week_start, date(2024, 1, 22));
        assert_eq!(tokyo.today, date(2024, 1, 22));
        // Session times stay pinned to the pool's clock.
        assert_eq!(tokyo.days[0].sessions[1].start, utc("2024-01-22T15:30:00Z"));
    }

    #[tokio::test]
    async fn all_days_failing_sets_week_error() {
        let source = StaticPage(Err(FetchError::HostNotFound));
        let week = fetch_week(&source, 0, la(), utc("2024-01-17T20:00:00Z"))
            .await
            .unwrap();
        assert_eq!(week.error.as_deref(), Some(ALL_DAYS_FAILED));
        assert!(week.days.iter().all(|d| d.error.is_some()));
    }

    #[tokio::test]
    async fn empty_week_sets_no_data() {
        let source = StaticPage(Ok("<p>Closed for the season</p>".to_owned()));
        let week = fetch_week(&source, 0, la(), utc("2024-01-17T20:00:00Z"))
            .await
            .unwrap();
        assert_eq!(week.error.as_deref(), Some(NO_WEEK_DATA));
        assert!(week.days.iter().all(|d| d.error.is_none()));
    }

    #[tokio::test]
    async fn partial_failure_stays_per_day() {
        let source = Flaky(AtomicUsize::new(0));
        let week = fetch_week(&source, 0, la(), utc("2024-01-17T20:00:00Z"))
            .await
            .unwrap();
        assert_eq!(week.error, None);
        let failed = week.days.iter().filter(|d| d.is_failed()).count();
        assert_eq!(failed, 4);
        assert_eq!(source.0.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn days_are_fetched_concurrently() {
        let source = Gathering(Barrier::new(7));
        let week = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_week(&source, 0, la(), utc("2024-01-17T20:00:00Z")),
        )
        .await
        .expect("seven fetches should be in flight together")
        .unwrap();
        assert_eq!(week.error, None);
    }
}
