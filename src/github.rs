use crate::http::{self, ApiError, RetryPolicy};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const DEFAULT_API: &str = "https://api.github.com/";

#[async_trait]
pub trait ProjectSearch: Send + Sync {
    /// Raw JSON body of a repository search for `term`
    async fn search(&self, term: &str) -> Result<String, ApiError>;
}

pub struct GithubClient {
    client: Client,
    api: Url,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl GithubClient {
    pub fn new(api: Url, retry: RetryPolicy, cancel: CancellationToken) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::client()?,
            api,
            retry,
            cancel,
        })
    }

    fn search_url(&self, term: &str) -> Result<Url, ApiError> {
        let mut url = self.api.join("search/repositories")?;
        url.query_pairs_mut().append_pair("q", term);
        Ok(url)
    }
}

#[async_trait]
impl ProjectSearch for GithubClient {
    async fn search(&self, term: &str) -> Result<String, ApiError> {
        let url = self.search_url(term)?;
        let response = self
            .retry
            .send(&url, &self.cancel, || {
                self.client
                    .get(url.clone())
                    .header(ACCEPT, "application/vnd.github+json")
            })
            .await?;
        let body = http::read_body(response, &url).await?;
        log::debug!("GitHub response: {}", body);
        Ok(body)
    }
}
