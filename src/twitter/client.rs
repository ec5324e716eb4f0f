use crate::http::{self, ApiError, RetryPolicy};
use crate::twitter::{BearerToken, Credentials, PostSearch};
use async_trait::async_trait;
use maplit::hashmap;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Application-only client for the v1.1 search API. The bearer token is
/// obtained once, when the client connects, and reused for its lifetime.
pub struct TwitterClient {
    client: Client,
    api: Url,
    credentials: Credentials,
    token: BearerToken,
    posts_per_page: u32,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl TwitterClient {
    pub async fn connect(
        credentials: Credentials,
        api: Url,
        posts_per_page: u32,
        retry: RetryPolicy,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let mut client = Self {
            client: http::client()?,
            api,
            credentials,
            token: BearerToken::default(),
            posts_per_page,
            retry,
            cancel,
        };
        client.token = client.authenticate().await?;
        if client.token.is_empty() {
            log::warn!("No bearer token available, searches will be unauthorized");
        }
        Ok(client)
    }

    // https://developer.twitter.com/en/docs/authentication/oauth-2-0/application-only
    pub async fn authenticate(&self) -> Result<BearerToken, ApiError> {
        let url = self.api.join("oauth2/token")?;
        let basic = format!("Basic {}", self.credentials.encode());
        let response = self
            .retry
            .send(&url, &self.cancel, || {
                self.client
                    .post(url.clone())
                    .header(AUTHORIZATION, &basic)
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body("grant_type=client_credentials")
            })
            .await?;
        let body = http::read_body(response, &url).await?;
        Ok(BearerToken::from_response(&body))
    }

    pub fn token(&self) -> &BearerToken {
        &self.token
    }
}

#[async_trait]
impl PostSearch for TwitterClient {
    async fn search_posts(&self, project_name: &str) -> Result<String, ApiError> {
        let url = self.api.join("1.1/search/tweets.json")?;
        let query = hashmap! {
            "result_type" => "recent".to_string(),
            "count" => self.posts_per_page.to_string(),
            "q" => project_name.to_string(),
        };
        let bearer = format!("Bearer {}", self.token.access_token);
        let response = self
            .retry
            .send(&url, &self.cancel, || {
                self.client
                    .get(url.clone())
                    .query(&query)
                    .header(AUTHORIZATION, &bearer)
            })
            .await?;
        let body = http::read_body(response, &url).await?;
        log::debug!("Twitter response for '{}': {}", project_name, body);
        Ok(body)
    }
}
