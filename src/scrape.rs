use core::{error::Error as _, time::Duration};
use std::io;

use reqwest::{Client, StatusCode};
use thiserror::Error;

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

pub fn basic(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
}

/// Why the schedule page could not be fetched. The messages are shown to end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Unable to connect to the pool schedule website (connection refused).")]
    ConnectionRefused,
    #[error("Unable to find the pool schedule website (host not found). Check your internet connection.")]
    HostNotFound,
    #[error("The pool schedule website took too long to respond.")]
    Timeout,
    #[error("The pool schedule website returned an error ({0}).")]
    Status(StatusCode),
    #[error("Failed to fetch pool hours: {0}")]
    Transport(String),
}

impl FetchError {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if let Some(status) = err.status() {
            return Self::Status(status);
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<io::Error>() {
                match io.kind() {
                    io::ErrorKind::ConnectionRefused => return Self::ConnectionRefused,
                    io::ErrorKind::TimedOut => return Self::Timeout,
                    _ => (),
                }
            }
            let message = cause.to_string();
            if message.contains("dns error") || message.contains("failed to lookup address") {
                return Self::HostNotFound;
            }
            source = cause.source();
        }

        Self::Transport(err.to_string())
    }
}

/// Somewhere the schedule page can be read from.
pub trait PageSource {
    fn fetch_page(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

pub struct Fetcher {
    client: Client,
    url: String,
}

impl Fetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: basic(timeout)?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PageSource for Fetcher {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        let res: Result<String, reqwest::Error> = async {
            self.client
                .get(&self.url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
        .await;

        match res {
            Ok(body) => {
                tracing::info!(target: "fetch", "{}: {} bytes", self.url, body.len());
                Ok(body)
            }
            Err(e) => {
                let err = FetchError::classify(&e);
                tracing::warn!(target: "fetch", "\x1b[31m{}: {e:?}\x1b[0m", self.url);
                Err(err)
            }
        }
    }
}
