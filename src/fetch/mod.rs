//! News retrieval backends.
//!
//! Every backend implements [`ArticleSource`]: given a search term, return
//! the matching articles as [`RawArticle`]s (possibly none).
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | NewsAPI | [`newsapi`] | JSON API | Requires an API key |
//! | Google News | [`google_news`] | RSS search | No key; descriptions are HTML |
//!
//! [`fetch_with_timeout`] bounds a fetch so a stalled source turns into a
//! [`FetchError::Timeout`] instead of a hung run.

pub mod google_news;
pub mod newsapi;

use crate::error::FetchError;
use crate::models::RawArticle;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("news_sentiment_report/", env!("CARGO_PKG_VERSION"));

/// A place to search for news articles.
pub trait ArticleSource {
    /// Human-readable source name for logs and error messages.
    fn name(&self) -> &str;

    /// Search for articles matching `search_term`.
    async fn fetch(&self, search_term: &str) -> Result<Vec<RawArticle>, FetchError>;
}

/// Run `source.fetch` with an upper bound on its duration.
#[instrument(level = "info", skip(source), fields(source_name = source.name()))]
pub async fn fetch_with_timeout<S>(source: &S, search_term: &str, limit: Duration) -> Result<Vec<RawArticle>, FetchError>
where
    S: ArticleSource + ?Sized,
{
    let t0 = Instant::now();
    match timeout(limit, source.fetch(search_term)).await {
        Ok(Ok(articles)) => {
            info!(
                count = articles.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetched articles"
            );
            Ok(articles)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Fetch failed");
            Err(e)
        }
        Err(_) => {
            warn!(?limit, "Fetch timed out");
            Err(FetchError::Timeout(limit))
        }
    }
}

/// Build the shared HTTP client used by the sources.
pub fn http_client(limit: Duration) -> Result<reqwest::Client, FetchError> {
    Ok(reqwest::Client::builder()
        .timeout(limit)
        .user_agent(USER_AGENT)
        .build()?)
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory sources for pipeline tests.

    use super::*;

    /// Returns a fixed list of articles.
    #[derive(Debug, Default, Clone)]
    pub struct StaticSource {
        pub articles: Vec<RawArticle>,
    }

    impl ArticleSource for StaticSource {
        fn name(&self) -> &str {
            "static"
        }

        async fn fetch(&self, _search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
            Ok(self.articles.clone())
        }
    }

    /// Never answers.
    #[derive(Debug, Default)]
    pub struct StalledSource;

    impl ArticleSource for StalledSource {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn fetch(&self, _search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
            std::future::pending::<()>().await;
            Ok(Vec::new())
        }
    }

    /// Always fails with a status error.
    #[derive(Debug, Default)]
    pub struct BrokenSource;

    impl ArticleSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(&self, _search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
            Err(FetchError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }
    }
}
