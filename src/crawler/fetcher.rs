//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the single, connection-pooled HTTP client
//! - GET requests with a bounded total timeout
//! - Classifying every response into a `FetchOutcome`
//!
//! Retrying is not done here; see `crawler::retry`.

use crate::config::HttpConfig;
use crate::crawler::retry::IsRetryable;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// Result of a single fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 response with its full body
    Ok {
        body: Vec<u8>,
        status: u16,
    },

    /// Any response other than 200
    StatusFailure {
        status: u16,
    },

    /// Timeout, connection error, or failure while reading the body
    TransportFailure {
        cause: String,
    },
}

impl FetchOutcome {
    /// Splits the outcome into body or error, for use with the retry combinator
    pub fn into_result(self) -> Result<Vec<u8>, FetchError> {
        match self {
            Self::Ok { body, .. } => Ok(body),
            Self::StatusFailure { status } => Err(FetchError::Status(status)),
            Self::TransportFailure { cause } => Err(FetchError::Transport(cause)),
        }
    }
}

/// A failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Status(u16),
    Transport(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP status {}", status),
            Self::Transport(cause) => write!(f, "transport failure: {}", cause),
        }
    }
}

impl std::error::Error for FetchError {}

/// Both remote failure kinds are transient from the crawler's point of view
impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Status(_) => true,
            Self::Transport(_) => true,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The client carries the fixed User-Agent header, follows redirects and
/// decodes gzip/brotli bodies. It is meant to be built once and shared.
///
/// # Example
///
/// ```no_run
/// use paper_harvest::config::HttpConfig;
/// use paper_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues GET requests through one shared client
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: config.timeout(),
        })
    }

    /// Fetches a URL with the configured total timeout
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        fetch_url(&self.client, url, self.timeout).await
    }
}

/// Fetches a URL and classifies the response
///
/// # Classification
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | HTTP 200, body read | Ok |
/// | Any other status | StatusFailure |
/// | Timeout (connect, headers or body) | TransportFailure |
/// | Connection refused/reset | TransportFailure |
/// | Body read error | TransportFailure |
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchOutcome {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return transport_failure(e),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchOutcome::StatusFailure {
            status: status.as_u16(),
        };
    }

    match response.bytes().await {
        Ok(body) => FetchOutcome::Ok {
            body: body.to_vec(),
            status: status.as_u16(),
        },
        Err(e) => transport_failure(e),
    }
}

fn transport_failure(e: reqwest::Error) -> FetchOutcome {
    let cause = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchOutcome::TransportFailure { cause }
}
