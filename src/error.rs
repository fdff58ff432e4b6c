//! Error types for the analysis pipeline.
//!
//! Errors are split by how far they travel:
//! - [`ClassifyError`] variants that are per-article ([`ClassifyError::is_systemic`]
//!   returns `false`) are absorbed by the pipeline and the article is dropped.
//! - [`FetchError`] and systemic [`ClassifyError`]s end the run and surface as
//!   a [`PipelineError`].
//! - [`ConfigError`] is raised while resolving the topic, before any run starts,
//!   and goes straight to the binary's exit path.

use std::time::Duration;
use thiserror::Error;

/// Failure while retrieving articles from a news source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("news source returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not parse response: {0}")]
    Parse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("news source is not configured: {0}")]
    NotConfigured(String),
}

/// Failure while classifying a single article.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The classifier answered but refused or errored for this input.
    #[error("classifier rejected the article: {0}")]
    Rejected(String),

    /// The classifier answered with something that is not a label and score.
    #[error("classifier returned a malformed response: {0}")]
    Malformed(String),

    /// The classifier service cannot be reached at all.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
}

impl ClassifyError {
    /// Whether this error means no further article can be classified either.
    pub fn is_systemic(&self) -> bool {
        matches!(self, ClassifyError::Unavailable(_) | ClassifyError::Timeout(_))
    }
}

/// Problems with the topic table.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read topic file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse topic file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid topic table: {0}")]
    Invalid(String),

    #[error("unknown topic {name:?}; available topics: {available}")]
    UnknownTopic { name: String, available: String },
}

/// Run-level failure. No bundle is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not retrieve news from {source_name}: {error}")]
    Fetch {
        source_name: String,
        #[source]
        error: FetchError,
    },

    #[error("sentiment classifier unavailable: {0}")]
    ClassifierUnavailable(#[source] ClassifyError),

    #[error("sentiment classification failed for all {attempted} articles")]
    ClassificationFailed { attempted: usize },
}
