use crate::http::RetryPolicy;
use crate::twitter::Credentials;
use crate::{github, twitter};
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use url::Url;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub twitter: Credentials,
    /// Keeps the number of tweet searches under the API rate limit
    #[serde(default = "default_project_results_count")]
    pub project_results_count: usize,
    #[serde(default = "default_posts_per_project")]
    pub posts_per_project: u32,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub endpoints: Endpoints,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Endpoints {
    pub github: Url,
    pub twitter: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github: Url::from_str(github::DEFAULT_API).expect("valid default GitHub URL"),
            twitter: Url::from_str(twitter::DEFAULT_API).expect("valid default Twitter URL"),
        }
    }
}

fn default_project_results_count() -> usize {
    10
}

fn default_posts_per_project() -> u32 {
    5
}

impl Config {
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let config = fs::read_to_string(path)
            .await
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        serde_json::from_str::<Config>(&config).context("Unable to deserialize config file")
    }
}
