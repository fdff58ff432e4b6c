//! Sentiment classification of articles.
//!
//! The pipeline only depends on the [`Classify`] trait. Two backends ship
//! with the crate:
//!
//! | Backend | Module | Notes |
//! |---------|--------|-------|
//! | Lexicon | [`lexicon`] | Offline, finance-tuned keyword lexicon |
//! | LLM | [`llm`] | OpenAI-compatible chat model via `awful_aj`, with retry |
//!
//! [`classify_all`] runs a classifier over a batch with bounded
//! parallelism and turns per-article failures into dropped articles while
//! escalating systemic ones.

pub mod lexicon;
pub mod llm;

use crate::error::{ClassifyError, PipelineError};
use crate::models::{Classification, RawArticle, ScoredArticle};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Separator placed between title and description in classifier input.
pub const TEXT_SEPARATOR: &str = ". ";

/// A sentiment classifier.
pub trait Classify {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Classify one piece of article text.
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;

    /// Upper bound [`classify_all`] places on one `classify` call, given the
    /// configured per-call timeout.
    ///
    /// Backends that make several attempts per article report the time all
    /// of them may take, so a slow run of per-article retries is never
    /// mistaken for a hung classifier.
    fn time_budget(&self, per_call: Duration) -> Duration {
        per_call
    }
}

/// Build the text sent to the classifier for an article.
///
/// Always `title` + [`TEXT_SEPARATOR`] + `description`, with the separator
/// omitted when either part is empty. A title ending in a single period gives
/// up that period to the separator; ellipses and abbreviations keep the rest.
///
/// # Arguments
///
/// * `article` - The article to describe
///
/// # Returns
///
/// The classifier input text, possibly empty.
pub fn article_text(article: &RawArticle) -> String {
    let title = article.title.trim();
    let description = article.description.trim();
    let head = title.strip_suffix('.').unwrap_or(title).trim_end();
    match (title.is_empty(), description.is_empty()) {
        (false, false) if head.is_empty() => description.to_string(),
        (false, false) => format!("{head}{TEXT_SEPARATOR}{description}"),
        (false, true) => title.to_string(),
        (true, _) => description.to_string(),
    }
}

/// Knobs for [`classify_all`].
#[derive(Debug, Clone, Copy)]
pub struct ClassifyOptions {
    /// Maximum classifications in flight at once.
    pub concurrency: usize,
    /// Upper bound on a single classifier call.
    pub timeout: Duration,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Result of classifying a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBatch {
    /// Successfully classified articles, in input order.
    pub articles: Vec<ScoredArticle>,
    /// Articles dropped because their classification failed.
    pub dropped: usize,
}

/// Classify every article, preserving input order in the output.
///
/// Calls run concurrently (up to `options.concurrency`) and are collected
/// by input index, so completion order never affects the result.
///
/// # Arguments
///
/// * `classifier` - Backend scoring each article
/// * `articles` - Relevant articles, in the order they should be reported
/// * `options` - Concurrency and per-call time limit
///
/// # Returns
///
/// The classified articles plus the number dropped for per-article failures.
///
/// # Errors
///
/// - [`PipelineError::ClassifierUnavailable`] as soon as any call reports a
///   systemic failure (service unavailable or timeout); remaining calls are
///   cancelled.
/// - [`PipelineError::ClassificationFailed`] if there was at least one article
///   and every one of them failed.
#[instrument(level = "info", skip_all, fields(classifier = classifier.name(), count = articles.len()))]
pub async fn classify_all<C>(
    classifier: &C,
    articles: Vec<RawArticle>,
    options: &ClassifyOptions,
) -> Result<ClassifiedBatch, PipelineError>
where
    C: Classify + ?Sized,
{
    let t0 = Instant::now();
    let attempted = articles.len();
    let limit = classifier.time_budget(options.timeout);

    let mut results: Vec<Option<Result<Classification, ClassifyError>>> =
        (0..attempted).map(|_| None).collect();
    {
        let mut in_flight = stream::iter(articles.iter().enumerate())
            .map(|(i, article)| async move {
                let text = article_text(article);
                let res = match timeout(limit, classifier.classify(&text)).await {
                    Ok(res) => res,
                    Err(_) => Err(ClassifyError::Timeout(limit)),
                };
                (i, res)
            })
            .buffer_unordered(options.concurrency.max(1));

        while let Some((i, res)) = in_flight.next().await {
            match res {
                Err(e) if e.is_systemic() => {
                    error!(index = i, error = %e, "Classifier failed systemically; aborting run");
                    return Err(PipelineError::ClassifierUnavailable(e));
                }
                res => results[i] = Some(res),
            }
        }
    }

    let mut scored = Vec::with_capacity(attempted);
    let mut dropped = 0usize;
    for (i, (article, res)) in articles.into_iter().zip(results).enumerate() {
        match res {
            Some(Ok(classification)) => {
                debug!(index = i, label = %classification.label, score = ?classification.score, "Classified article");
                scored.push(ScoredArticle::new(article, classification));
            }
            Some(Err(e)) => {
                warn!(
                    index = i,
                    title = %truncate_for_log(&article.title, 80),
                    error = %e,
                    "Classification failed; dropping article"
                );
                dropped += 1;
            }
            None => dropped += 1,
        }
    }

    if attempted > 0 && scored.is_empty() {
        error!(attempted, "Every classification failed");
        return Err(PipelineError::ClassificationFailed { attempted });
    }

    info!(
        classified = scored.len(),
        dropped,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "Classification complete"
    );
    Ok(ClassifiedBatch {
        articles: scored,
        dropped,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted classifier for pipeline tests.

    use super::*;
    use crate::models::Sentiment;

    /// Classifies by looking up a marker word in the text.
    ///
    /// Text containing `"FAIL"` is rejected, `"DOWN"` reports the service as
    /// unavailable and `"SLOW"` sleeps past any reasonable timeout.
    #[derive(Debug, Default)]
    pub struct ScriptedClassifier {
        pub rules: Vec<(&'static str, Sentiment, Option<f64>)>,
    }

    impl ScriptedClassifier {
        pub fn new(rules: Vec<(&'static str, Sentiment, Option<f64>)>) -> Self {
            Self { rules }
        }
    }

    impl Classify for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
            if text.contains("SLOW") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if text.contains("DOWN") {
                return Err(ClassifyError::Unavailable("connection refused".to_string()));
            }
            if text.contains("FAIL") {
                return Err(ClassifyError::Rejected("scripted failure".to_string()));
            }
            for (marker, label, score) in &self.rules {
                if text.contains(marker) {
                    return Ok(Classification {
                        label: *label,
                        score: *score,
                    });
                }
            }
            Ok(Classification::new(Sentiment::Neutral, 0.5))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedClassifier;
    use super::*;
    use crate::models::Sentiment;

    #[test]
    fn test_article_text_joins_with_separator() {
        let a = RawArticle::new("A", "Tariffs rise.", "trade war escalates");
        assert_eq!(article_text(&a), "Tariffs rise. trade war escalates");
        let b = RawArticle::new("B", "Only title", "");
        assert_eq!(article_text(&b), "Only title");
        let c = RawArticle::new("C", "", "Only description");
        assert_eq!(article_text(&c), "Only description");
    }

    #[test]
    fn test_article_text_strips_one_trailing_period() {
        let a = RawArticle::new("A", "Stocks slump in the U.S.", "futures fall");
        assert_eq!(article_text(&a), "Stocks slump in the U.S. futures fall");
        let b = RawArticle::new("B", "Markets wait...", "Fed decision due");
        assert_eq!(article_text(&b), "Markets wait... Fed decision due");
        let c = RawArticle::new("C", "...", "Fed decision due");
        assert_eq!(article_text(&c), "... Fed decision due");
        let d = RawArticle::new("D", ".", "Fed decision due");
        assert_eq!(article_text(&d), "Fed decision due");
    }

    #[tokio::test]
    async fn test_classify_all_preserves_order_and_drops_failures() {
        let classifier = ScriptedClassifier::new(vec![
            ("good", Sentiment::Positive, Some(0.9)),
            ("bad", Sentiment::Negative, Some(0.8)),
        ]);
        let articles = vec![
            RawArticle::new("A", "good news", ""),
            RawArticle::new("B", "FAIL here", ""),
            RawArticle::new("C", "bad news", ""),
            RawArticle::new("D", "meh", ""),
        ];
        let options = ClassifyOptions {
            concurrency: 3,
            timeout: Duration::from_secs(5),
        };
        let batch = classify_all(&classifier, articles, &options).await.unwrap();
        let sources: Vec<_> = batch.articles.iter().map(|a| a.source.as_str()).collect();
        assert_eq!(sources, vec!["A", "C", "D"]);
        assert_eq!(batch.dropped, 1);
        assert_eq!(batch.articles[2].sentiment, Sentiment::Neutral);
    }

    #[tokio::test]
    async fn test_classify_all_empty_batch_is_ok() {
        let classifier = ScriptedClassifier::default();
        let batch = classify_all(&classifier, vec![], &ClassifyOptions::default())
            .await
            .unwrap();
        assert!(batch.articles.is_empty());
        assert_eq!(batch.dropped, 0);
    }

    #[tokio::test]
    async fn test_classify_all_every_article_failing_fails_run() {
        let classifier = ScriptedClassifier::default();
        let articles = vec![
            RawArticle::new("A", "FAIL one", ""),
            RawArticle::new("B", "FAIL two", ""),
        ];
        let err = classify_all(&classifier, articles, &ClassifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ClassificationFailed { attempted: 2 }));
    }

    #[tokio::test]
    async fn test_classify_all_unavailable_aborts() {
        let classifier = ScriptedClassifier::default();
        let articles = vec![
            RawArticle::new("A", "fine", ""),
            RawArticle::new("B", "DOWN", ""),
        ];
        let err = classify_all(&classifier, articles, &ClassifyOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ClassifierUnavailable(ClassifyError::Unavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_classify_all_timeout_aborts() {
        let classifier = ScriptedClassifier::default();
        let articles = vec![RawArticle::new("A", "SLOW", "")];
        let options = ClassifyOptions {
            concurrency: 1,
            timeout: Duration::from_millis(50),
        };
        let err = classify_all(&classifier, articles, &options).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ClassifierUnavailable(ClassifyError::Timeout(_))
        ));
    }
}
