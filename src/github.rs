use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{Result, TrackerError};
use crate::source::UserSource;
use crate::types::{Profile, Repository};

/// Unauthenticated GitHub REST client.
pub struct GitHub {
    client: Client,
    base_url: String,
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Api(err.to_string())
    }
}

impl GitHub {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| TrackerError::Config(format!("invalid user_agent: {}", e)))?,
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!(url, ?query, "GET");
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TrackerError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TrackerError::Api(format!("GitHub API {}: {}", status, text)));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TrackerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl UserSource for GitHub {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn get_user(&self, username: &str) -> Result<Profile> {
        let url = self.api_url(&format!("/users/{}", urlencoding::encode(username)));
        self.get_json(&url, &[]).await
    }

    async fn list_repos(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>> {
        let url = self.api_url(&format!("/users/{}/repos", urlencoding::encode(username)));
        let query = [
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("sort", "stars".to_string()),
            ("direction", "desc".to_string()),
        ];
        self.get_json(&url, &query).await
    }
}
