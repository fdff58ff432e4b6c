//! [NewsAPI](https://newsapi.org) `/v2/everything` search.
//!
//! Responses look like:
//!
//! ```json
//! {"status": "ok", "totalResults": 2, "articles": [
//!   {"source": {"id": null, "name": "Reuters"}, "title": "...", "description": "..."}
//! ]}
//! ```
//!
//! Any field may be `null`; missing strings become empty strings. NewsAPI
//! marks deleted articles with the literal title `"[Removed]"`, which are
//! discarded here.

use super::{ArticleSource, http_client};
use crate::error::FetchError;
use crate::models::RawArticle;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";
const REMOVED_PLACEHOLDER: &str = "[Removed]";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    #[serde(default)]
    source: Option<ApiSource>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    #[serde(default)]
    name: Option<String>,
}

impl From<ApiArticle> for RawArticle {
    fn from(a: ApiArticle) -> Self {
        RawArticle {
            source: a.source.and_then(|s| s.name).unwrap_or_default(),
            title: a.title.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
        }
    }
}

/// NewsAPI search client.
pub struct NewsApiSource {
    client: Client,
    api_key: String,
    endpoint: Url,
    page_size: u32,
}

impl std::fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NewsApiSource {
    /// Create a client. Fails when no API key is supplied.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FetchError::NotConfigured("NewsAPI key is required (--newsapi-key or NEWSAPI_KEY)".to_string()))?;
        let endpoint = Url::parse(DEFAULT_ENDPOINT).map_err(|e| FetchError::NotConfigured(e.to_string()))?;
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            endpoint,
            page_size: 50,
        })
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 100);
        self
    }

    fn search_url(&self, search_term: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", search_term)
            .append_pair("language", "en")
            .append_pair("sortBy", "publishedAt")
            .append_pair("pageSize", &self.page_size.to_string());
        url
    }
}

/// Decode a NewsAPI response body into articles.
pub fn parse_response(status: u16, body: &str) -> Result<Vec<RawArticle>, FetchError> {
    let parsed: ApiResponse = serde_json::from_str(body).map_err(|e| {
        if !(200..300).contains(&status) {
            FetchError::Status {
                status,
                message: crate::utils::truncate_for_log(body, 200),
            }
        } else {
            FetchError::Parse(e.to_string())
        }
    })?;

    if parsed.status != "ok" || !(200..300).contains(&status) {
        let message = match (parsed.code, parsed.message) {
            (Some(code), Some(msg)) => format!("{code}: {msg}"),
            (None, Some(msg)) => msg,
            (Some(code), None) => code,
            (None, None) => format!("status {:?}", parsed.status),
        };
        return Err(FetchError::Status { status, message });
    }

    Ok(parsed
        .articles
        .into_iter()
        .map(RawArticle::from)
        .filter(|a| a.title.trim() != REMOVED_PLACEHOLDER)
        .collect())
}

impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
        let url = self.search_url(search_term);
        debug!(url = %url, "Requesting NewsAPI");
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let articles = parse_response(status, &body)?;
        info!(count = articles.len(), "NewsAPI returned articles");
        Ok(articles)
    }
}
