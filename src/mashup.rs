//! Joins repository search results with recent tweets about each repository.

use crate::github::ProjectSearch;
use crate::http::ApiError;
use crate::model::{PostSearchResult, Project, SearchResult};
use crate::twitter::PostSearch;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MashupError {
    #[error("Search term cannot be empty. Please try again with a valid search term")]
    EmptySearchTerm,
    #[error("Error calling API end point: {0}")]
    Api(
        #[source]
        #[from]
        ApiError,
    ),
    #[error("Unable to deserialize {api} response: {source}")]
    Parse {
        api: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{api} returned errors: {errors}")]
    Upstream { api: &'static str, errors: String },
    #[error("Unable to serialize summary: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiResponse<T> {
    // Detect the case where the API returns 200, but contains errors
    Error { errors: serde_json::Value },
    Ok(T),
}

fn deserialize_body<T: DeserializeOwned>(body: &str, api: &'static str) -> Result<T, MashupError> {
    match serde_json::from_str::<ApiResponse<T>>(body) {
        Ok(ApiResponse::Ok(ok)) => Ok(ok),
        Ok(ApiResponse::Error { errors }) => Err(MashupError::Upstream {
            api,
            errors: errors.to_string(),
        }),
        // Deserialize again without the envelope for a useful error message
        Err(_) => serde_json::from_str::<T>(body).map_err(|source| MashupError::Parse { api, source }),
    }
}

pub fn validate_search_term(term: &str) -> Result<&str, MashupError> {
    if term.trim().is_empty() {
        return Err(MashupError::EmptySearchTerm);
    }
    Ok(term)
}

pub struct Mashup {
    projects: Box<dyn ProjectSearch>,
    posts: Box<dyn PostSearch>,
    max_projects: usize,
    posts_per_project: usize,
}

impl Mashup {
    pub fn new(
        projects: Box<dyn ProjectSearch>,
        posts: Box<dyn PostSearch>,
        max_projects: usize,
        posts_per_project: usize,
    ) -> Self {
        Self {
            projects,
            posts,
            max_projects,
            posts_per_project,
        }
    }

    /// Pretty printed summary of the projects matching `term` and their tweets
    pub async fn summary(&self, term: &str) -> Result<String, MashupError> {
        let result = self.collect(term).await?;
        serde_json::to_string_pretty(&result).map_err(MashupError::Serialize)
    }

    pub async fn collect(&self, term: &str) -> Result<SearchResult, MashupError> {
        let term = validate_search_term(term)?;
        let mut projects = self.find_projects(term).await?;
        self.attach_tweets(&mut projects).await?;
        Ok(SearchResult {
            total_count: None,
            items: projects,
        })
    }

    async fn find_projects(&self, term: &str) -> Result<Vec<Project>, MashupError> {
        let body = self.projects.search(term).await?;
        let mut result: SearchResult = deserialize_body(&body, "GitHub")?;
        log::info!(
            "Found {} projects for '{}' ({} in total)",
            result.items.len(),
            term,
            result.total_count.unwrap_or_default()
        );
        result.items.truncate(self.max_projects);
        Ok(result.items)
    }

    // One project at a time, in search order
    async fn attach_tweets(&self, projects: &mut [Project]) -> Result<(), MashupError> {
        for project in projects.iter_mut() {
            let body = self.posts.search_posts(&project.name).await?;
            let mut result: PostSearchResult = deserialize_body(&body, "Twitter")?;
            result.statuses.truncate(self.posts_per_project);
            log::info!("Got {} tweets for {}", result.statuses.len(), project.name);
            project.tweets = Some(result.statuses);
        }
        Ok(())
    }
}
