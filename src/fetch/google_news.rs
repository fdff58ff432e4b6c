//! Google News RSS search.
//!
//! Google News needs no API key. Each `<item>` carries the headline with a
//! ` - Publisher` suffix, a `<source>` element naming the publisher, and an
//! HTML description that usually repeats the headline as a link.

use super::{ArticleSource, http_client};
use crate::error::FetchError;
use crate::models::RawArticle;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const SEARCH_ENDPOINT: &str = "https://news.google.com/rss/search";

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(rename = "$text", default)]
    name: String,
}

/// Remove tags and HTML entities left in an RSS description.
pub fn strip_html(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // last, so "&amp;lt;" stays "&lt;"
        .replace("&amp;", "&");
    SPACES.replace_all(text.trim(), " ").into_owned()
}

/// Split `"Headline - Publisher"` into its parts, preferring `source` as the publisher.
fn split_headline(title: &str, source: Option<&str>) -> (String, String) {
    let title = title.trim();
    if let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) {
        let suffix = format!(" - {source}");
        let headline = title.strip_suffix(&suffix).unwrap_or(title);
        return (headline.trim().to_string(), source.to_string());
    }
    match title.rsplit_once(" - ") {
        Some((headline, publisher)) if !headline.trim().is_empty() => {
            (headline.trim().to_string(), publisher.trim().to_string())
        }
        _ => (title.to_string(), String::new()),
    }
}

/// Decode a Google News RSS document into articles.
pub fn parse_feed(xml: &str) -> Result<Vec<RawArticle>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| FetchError::Parse(e.to_string()))?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .map(|item| {
            let (title, source) = split_headline(&item.title, item.source.as_ref().map(|s| s.name.as_str()));
            let mut description = strip_html(&item.description);
            // Google often repeats "Headline Publisher" as the whole description
            let echo = format!("{title} {source}");
            if description == title || description.trim() == echo.trim() {
                description.clear();
            }
            RawArticle {
                source,
                title,
                description,
            }
        })
        .collect())
}

/// Google News RSS search client.
#[derive(Debug, Clone)]
pub struct GoogleNewsSource {
    client: Client,
    language: String,
    country: String,
}

impl GoogleNewsSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client(timeout)?,
            language: "en-US".to_string(),
            country: "US".to_string(),
        })
    }

    fn search_url(&self, search_term: &str) -> Result<Url, FetchError> {
        let lang = self.language.split('-').next().unwrap_or("en");
        let ceid = format!("{}:{}", self.country, lang);
        Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[
                ("q", search_term),
                ("hl", self.language.as_str()),
                ("gl", self.country.as_str()),
                ("ceid", ceid.as_str()),
            ],
        )
        .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

impl ArticleSource for GoogleNewsSource {
    fn name(&self) -> &str {
        "Google News"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
        let url = self.search_url(search_term)?;
        debug!(url = %url, "Requesting Google News RSS");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: format!("Google News returned status {status}"),
            });
        }
        let body = response.text().await?;
        let articles = parse_feed(&body)?;
        info!(count = articles.len(), "Google News returned articles");
        Ok(articles)
    }
}
