use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Bounds a single stalled attempt
const TIMEOUT_SEC: u64 = 120;
const USER_AGENT: &str = "git-tweet-mashup";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid endpoint URL specified: {0}")]
    InvalidUrl(
        #[source]
        #[from]
        url::ParseError,
    ),
    #[error("Error performing HTTP request to {url}: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("Client error response code {status} from {url}")]
    ClientError { status: u16, url: Url },
    #[error("Unknown response code {status} from {url}")]
    UnexpectedStatus { status: u16, url: Url },
    #[error("Server error response code {status} from {url} after {attempts} attempts")]
    RetriesExhausted { status: u16, url: Url, attempts: u32 },
    #[error("Request to {url} was cancelled")]
    Cancelled { url: Url },
}

impl ApiError {
    /// Status code that caused the failure, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ClientError { status, .. }
            | ApiError::UnexpectedStatus { status, .. }
            | ApiError::RetriesExhausted { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    ClientError,
    /// Presumed transient, worth another attempt
    ServerError,
    Unknown,
}

impl ResponseClass {
    pub fn of(status: StatusCode) -> Self {
        match status.as_u16() {
            200 => ResponseClass::Success,
            400..=499 => ResponseClass::ClientError,
            // The server will never support the request, retrying can't help
            501 => ResponseClass::Unknown,
            500..=599 => ResponseClass::ServerError,
            _ => ResponseClass::Unknown,
        }
    }
}

/// Linear backoff: the k-th retry waits `k * delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub fn delay_before(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_ms.saturating_mul(u64::from(attempt)))
    }

    /// Sends the request built by `request` until it succeeds, fails fatally or
    /// runs out of retries. A fresh request is built for each attempt.
    pub async fn send<F>(
        &self,
        url: &Url,
        cancel: &CancellationToken,
        request: F,
    ) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_status = 0;
        let mut attempts = 0;
        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = self.delay_before(attempt);
                log::debug!("Retry {} for {} in {:?}", attempt, url, delay);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return Err(ApiError::Cancelled { url: url.clone() });
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            attempts += 1;
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(ApiError::Cancelled { url: url.clone() });
                }
                response = request().send() => response.map_err(|source| ApiError::Network {
                    url: url.clone(),
                    source,
                })?,
            };
            let status = response.status();
            match ResponseClass::of(status) {
                ResponseClass::Success => {
                    log::info!("{} OK", url);
                    return Ok(response);
                }
                ResponseClass::ClientError => {
                    log::error!("{} client error response code: {}", url, status);
                    return Err(ApiError::ClientError {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                ResponseClass::ServerError => {
                    log::warn!("{} server error response code: {}", url, status);
                    last_status = status.as_u16();
                }
                ResponseClass::Unknown => {
                    log::error!("{} unknown response code: {}", url, status);
                    return Err(ApiError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
            }
        }
        Err(ApiError::RetriesExhausted {
            status: last_status,
            url: url.clone(),
            attempts,
        })
    }
}

pub async fn read_body(response: Response, url: &Url) -> Result<String, ApiError> {
    response.text().await.map_err(|source| ApiError::Network {
        url: url.clone(),
        source,
    })
}

pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SEC))
        .build()
}
