use core::time::Duration;
use std::sync::Arc;

use pool::config;

#[derive(clap::Parser)]
#[command(version, about = "Serves lap and recreational swim hours scraped from the pool's schedule page")]
struct Args {
    /// Schedule page to scrape
    #[arg(long, env = "POOL_SITE_URL")]
    url: Option<String>,
    /// Address to listen on
    #[arg(short, long, env = "POOL_LISTEN", default_value = config::LISTEN)]
    listen: String,
    /// Per-fetch timeout, in seconds
    #[arg(short, long, env = "POOL_FETCH_TIMEOUT", default_value_t = config::FETCH_TIMEOUT.as_secs())]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use clap::Parser;
    use tokio::net::TcpListener;

    pretty_env_logger::init_timed();

    let args = Args::parse();

    let fetcher = pool::scrape::Fetcher::new(
        config::site_url(args.url)?,
        Duration::from_secs(args.timeout),
    )?;
    tracing::info!(target: "main", "scraping \x1b[1;36m{}\x1b[0m", fetcher.url());

    let app = pool::api::router(Arc::new(fetcher));

    let listener = TcpListener::bind(&args.listen).await?;
    tracing::info!(target: "main", "listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.map_err(Into::into)
}
