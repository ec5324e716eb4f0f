mod client;

pub use client::TwitterClient;

use crate::http::ApiError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::fmt;
use url::form_urlencoded;

pub const DEFAULT_API: &str = "https://api.twitter.com/";

#[async_trait]
pub trait PostSearch: Send + Sync {
    /// Raw JSON body of a recent-tweet search for `project_name`
    async fn search_posts(&self, project_name: &str) -> Result<String, ApiError>;
}

/// Application-only consumer credentials
#[derive(Deserialize, Clone)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl Credentials {
    /// Value for the `Basic` authorization header of the token exchange
    pub fn encode(&self) -> String {
        let key: String = form_urlencoded::byte_serialize(self.consumer_key.as_bytes()).collect();
        let secret: String =
            form_urlencoded::byte_serialize(self.consumer_secret.as_bytes()).collect();
        STANDARD.encode(format!("{key}:{secret}"))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Clone, Default, PartialEq)]
pub struct BearerToken {
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub access_token: String,
}

impl BearerToken {
    /// Parses the token endpoint's response. Anything other than a bearer token
    /// yields an empty token, which later search calls will be refused with.
    pub fn from_response(body: &str) -> Self {
        match serde_json::from_str::<BearerToken>(body) {
            Ok(token) if token.token_type == "bearer" && !token.access_token.is_empty() => token,
            Ok(token) => {
                log::warn!(
                    "Token endpoint returned unusable token of type '{}'",
                    token.token_type
                );
                Self::default()
            }
            Err(e) => {
                log::warn!("Unable to deserialize bearer token: {}", e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token_type", &self.token_type)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
