use core::time::Duration;

macro_rules! env_or_default {
    ($name:expr, $default:expr) => {
        if let Some(s) = option_env!($name) {
            s
        } else {
            $default
        }
    };
}

/// Schedule page baked in at build time, if any.
pub const SITE_URL: Option<&str> = option_env!("POOL_SITE_URL");
pub const LISTEN: &str = env_or_default!("POOL_LISTEN", "127.0.0.1:3001");
pub const CLIENT_TIMEZONE: &str = env_or_default!("POOL_CLIENT_TIMEZONE", "America/Los_Angeles");
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the schedule page from a command-line/env value or the build-time default.
pub fn site_url(arg: Option<String>) -> anyhow::Result<String> {
    arg.or_else(|| SITE_URL.map(ToOwned::to_owned))
        .ok_or_else(|| anyhow::anyhow!("no schedule page configured; pass --url or set POOL_SITE_URL"))
}
