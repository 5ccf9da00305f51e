use core::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use pool::{
    aggregate, config,
    schedule::DayResult,
    scrape::Fetcher,
    time::{self, site_clock},
};

#[derive(clap::Parser)]
#[command(version, about = "Shows lap and recreational swim hours from the pool's schedule page")]
struct Args {
    /// Schedule page to scrape
    #[arg(long, env = "POOL_SITE_URL", global = true)]
    url: Option<String>,
    /// Per-fetch timeout, in seconds
    #[arg(long, env = "POOL_FETCH_TIMEOUT", default_value_t = config::FETCH_TIMEOUT.as_secs(), global = true)]
    timeout: u64,
    /// Print the JSON body the server would answer with
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sessions for one date, today by default
    Day {
        #[arg(short, long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Sessions for a Monday-to-Sunday week
    Week {
        /// Weeks away from the current one
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        /// Timezone deciding which week is current
        #[arg(long, default_value = config::CLIENT_TIMEZONE)]
        timezone: String,
    },
}

fn print_day(day: &DayResult, today: bool) {
    let marker = match (today, day.is_open_now) {
        (_, true) => " \x1b[1;32mopen now\x1b[0m",
        (true, false) => " \x1b[1mtoday\x1b[0m",
        _ => "",
    };
    println!("{} {}{marker}", day.weekday_name, day.date);

    if let Some(error) = &day.error {
        println!("  \x1b[31m{error}\x1b[0m");
    } else if day.sessions.is_empty() {
        println!("  no sessions");
    }
    for session in &day.sessions {
        let span = format!("{} - {}", site_clock(session.start), site_clock(session.end));
        println!("  {span:<20}{}", session.kind);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use pool::api::dto::{DayResponse, WeekResponse};

    pretty_env_logger::init_timed();

    let args = Args::parse();

    let fetcher = Fetcher::new(config::site_url(args.url)?, Duration::from_secs(args.timeout))?;
    let now = Utc::now();

    match args.command {
        Commands::Day { date } => {
            let date = date.unwrap_or_else(|| time::site_today(now));
            let day = aggregate::fetch_day(&fetcher, date, now).await;
            let failed = day.is_failed();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&DayResponse::new(day, now))?);
            } else {
                print_day(&day, date == time::site_today(now));
            }
            if failed {
                anyhow::bail!("could not load pool hours for {date}");
            }
        }
        Commands::Week { offset, timezone } => {
            let tz: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown timezone {timezone:?}"))?;
            let week = aggregate::fetch_week(&fetcher, offset, tz, now)
                .await
                .ok_or_else(|| anyhow::anyhow!("week offset {offset} is out of range"))?;
            let failed = week.days.iter().all(DayResult::is_failed);
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&WeekResponse::new(week, offset, now))?
                );
            } else {
                println!("Week of {} to {}\n", week.week_start, week.week_end);
                for day in &week.days {
                    print_day(day, day.date == week.today);
                }
                if let Some(error) = &week.error {
                    println!("\n\x1b[33m{error}\x1b[0m");
                }
            }
            if failed {
                anyhow::bail!("could not load pool hours for the week");
            }
        }
    }

    Ok(())
}
