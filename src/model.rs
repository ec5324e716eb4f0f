use serde::{Deserialize, Deserializer, Serialize};

/// Envelope of the repository search API, and of the summary written out.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    #[serde(default, skip_serializing)]
    pub total_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Project>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub html_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unset until the project has been enriched with tweets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweets: Option<Vec<Tweet>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Owner {
    pub login: String,
    pub avatar_url: String,
    pub organizations_url: String,
    pub r#type: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct PostSearchResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub statuses: Vec<Tweet>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Tweet {
    pub text: String,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub favorite_count: u64,
    pub user: TwitterUser,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct TwitterUser {
    pub name: String,
    pub screen_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
