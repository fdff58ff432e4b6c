//! One end-to-end analysis run.
//!
//! [`analyze_topic`] is the single entry point used by the binary:
//!
//! 1. **Fetch**: search the news source for the topic's search term
//! 2. **Filter**: drop duplicates and articles that miss every keyword
//! 3. **Classify**: score each remaining article's sentiment
//! 4. **Aggregate**: tally labels and rank the polarity groups
//! 5. **Summarize**: write the positive and negative insight sections
//!
//! The run touches no shared state. It returns a fresh [`ReportBundle`] or a
//! [`PipelineError`]; a failed run never yields a partial bundle.

use crate::aggregate::aggregate;
use crate::classify::{Classify, ClassifyOptions, classify_all};
use crate::config::TopicSetting;
use crate::error::PipelineError;
use crate::fetch::{ArticleSource, fetch_with_timeout};
use crate::filter::{dedupe_articles, filter_articles};
use crate::models::{ReportBundle, Sentiment};
use crate::summarize::summarize_by_sentiment;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

pub const POSITIVE_HEADER: &str = "✅ **Positive Insight**";
pub const NEGATIVE_HEADER: &str = "❗ **Negative Insight**";

/// Time and parallelism limits for a run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub fetch_timeout: Duration,
    pub classify: ClassifyOptions,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(20),
            classify: ClassifyOptions::default(),
        }
    }
}

/// Join the two insight sections under their fixed headers.
///
/// Every header and body is separated from the next by exactly one blank line.
pub fn compose_narrative(positive: &str, negative: &str) -> String {
    format!(
        "{POSITIVE_HEADER}\n\n{}\n\n{NEGATIVE_HEADER}\n\n{}",
        positive.trim(),
        negative.trim()
    )
}

/// Run the full pipeline for one topic.
///
/// # Arguments
///
/// * `topic` - Display name of the topic
/// * `setting` - Search term and keywords for the topic
/// * `source` - News source to search
/// * `classifier` - Sentiment backend
/// * `options` - Fetch timeout and classification limits
///
/// # Returns
///
/// A [`ReportBundle`] holding the counts, ranked articles and narrative.
///
/// # Errors
///
/// - [`PipelineError::Fetch`] when the news source errors or times out.
/// - [`PipelineError::ClassifierUnavailable`] / [`PipelineError::ClassificationFailed`]
///   when classification fails systemically.
///
/// Zero relevant articles is not an error: the bundle has zero counts and
/// no-coverage insight text.
#[instrument(level = "info", skip(setting, source, classifier, options), fields(search_term = %setting.search_term))]
pub async fn analyze_topic<S, C>(
    topic: &str,
    setting: &TopicSetting,
    source: &S,
    classifier: &C,
    options: &RunOptions,
) -> Result<ReportBundle, PipelineError>
where
    S: ArticleSource + ?Sized,
    C: Classify + ?Sized,
{
    let t0 = Instant::now();

    let raw = fetch_with_timeout(source, &setting.search_term, options.fetch_timeout)
        .await
        .map_err(|error| {
            error!(error = %error, "Could not retrieve news");
            PipelineError::Fetch {
                source_name: source.name().to_string(),
                error,
            }
        })?;
    let fetched = raw.len();

    let relevant = filter_articles(dedupe_articles(raw), &setting.keywords);
    let filtered_out = fetched - relevant.len();
    info!(fetched, relevant = relevant.len(), filtered_out, "Filtered articles");

    let batch = classify_all(classifier, relevant, &options.classify).await?;
    let grouped = aggregate(&batch.articles);

    let positive = summarize_by_sentiment(&batch.articles, Sentiment::Positive, &setting.keywords);
    let negative = summarize_by_sentiment(&batch.articles, Sentiment::Negative, &setting.keywords);

    let bundle = ReportBundle {
        topic: topic.to_string(),
        search_term: setting.search_term.clone(),
        generated_at: Utc::now(),
        counts: grouped.counts,
        positive: grouped.positive,
        negative: grouped.negative,
        narrative: compose_narrative(&positive, &negative),
        filtered_out,
        dropped: batch.dropped,
    };

    info!(
        positive = bundle.counts.positive,
        neutral = bundle.counts.neutral,
        negative = bundle.counts.negative,
        dropped = bundle.dropped,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Analysis run complete"
    );
    Ok(bundle)
}
