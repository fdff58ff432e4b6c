//! LLM-backed sentiment classification with retry.
//!
//! [`LlmClassifier`] sends the article text to an OpenAI-compatible chat
//! endpoint through `awful_aj` and expects a JSON verdict back:
//!
//! ```json
//! {"label": "NEGATIVE", "score": 0.87}
//! ```
//!
//! [`RetryClassify`] wraps any [`Classify`] implementation and retries
//! per-article failures with exponential backoff and jitter. Systemic
//! failures are returned immediately: retrying a dead endpoint for every
//! article only delays the run-level error.
//!
//! # Retry Strategy
//!
//! - Exponential backoff starting at `base_delay`
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay
//! - Each attempt is bounded by `attempt_timeout`; an attempt that hangs
//!   past it is a systemic [`ClassifyError::Timeout`]
//! - [`Classify::time_budget`] reports the worst case over every attempt and
//!   backoff, so the caller's per-article bound never cuts a retry short

use super::Classify;
use crate::error::ClassifyError;
use crate::models::{Classification, Sentiment};
use crate::utils::{looks_truncated, truncate_for_log};
use awful_aj::api::ask;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use rand::{Rng, rng};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, instrument, warn};

const MAX_JITTER: Duration = Duration::from_millis(250);

/// Decorator adding exponential backoff retry to a [`Classify`] backend.
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryClassify<C> {
    inner: C,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    attempt_timeout: Duration,
}

impl<C> RetryClassify<C>
where
    C: Classify,
{
    pub fn new(inner: C, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            attempt_timeout: Duration::from_secs(20),
        }
    }

    /// Bound each attempt (not the whole retry sequence) by `limit`.
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = limit;
        self
    }

    /// Longest time a single `classify` call can take: every attempt running
    /// to its timeout plus every backoff at its maximum jitter.
    pub fn budget(&self) -> Duration {
        let backoffs: Duration = (1..=self.max_retries)
            .map(|attempt| self.max_backoff(attempt) + MAX_JITTER)
            .sum();
        self.attempt_timeout.saturating_mul(self.max_retries as u32 + 1) + backoffs
    }

    fn max_backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        self.base_delay.saturating_mul(1 << shift).min(self.max_delay)
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let jitter_ms: u64 = rng().random_range(0..=MAX_JITTER.as_millis() as u64);
        self.max_backoff(attempt) + Duration::from_millis(jitter_ms)
    }
}

impl<C> fmt::Debug for RetryClassify<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryClassify")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl<C> Classify for RetryClassify<C>
where
    C: Classify,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn time_budget(&self, _per_call: Duration) -> Duration {
        self.budget()
    }

    #[instrument(level = "debug", skip_all)]
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let res = match timeout(self.attempt_timeout, self.inner.classify(text)).await {
                Ok(res) => res,
                Err(_) => Err(ClassifyError::Timeout(self.attempt_timeout)),
            };
            match res {
                Ok(c) => return Ok(c),
                Err(e) if e.is_systemic() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        warn!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "classify() exhausted retries"
                        );
                        return Err(e);
                    }
                    let delay = self.backoff(attempt);
                    debug!(attempt, ?delay, error = %e, "classify() attempt failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Chat-model classifier using an `awful_aj` config and template.
///
/// The template's system prompt is expected to instruct the model to answer
/// with a single JSON object holding `label` and `score`.
pub struct LlmClassifier {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl LlmClassifier {
    pub fn new(config: AwfulJadeConfig, template: ChatTemplate) -> Self {
        Self { config, template }
    }
}

impl fmt::Debug for LlmClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClassifier")
            .field("config", &"<redacted>")
            .finish()
    }
}

impl Classify for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    #[instrument(level = "debug", skip_all)]
    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let t0 = Instant::now();
        let response = ask(&self.config, text.to_string(), &self.template, None, None)
            .await
            .map_err(|e| {
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "API call failed");
                classify_api_error(e.as_ref())
            })?;
        parse_verdict(&response)
    }
}

/// Map an `awful_aj` error to a [`ClassifyError`].
///
/// Connection-level failures mean the endpoint is down for every article.
fn classify_api_error(e: &(dyn Error + 'static)) -> ClassifyError {
    let mut cur: Option<&(dyn Error + 'static)> = Some(e);
    while let Some(err) = cur {
        if let Some(re) = err.downcast_ref::<reqwest::Error>() {
            if re.is_connect() {
                return ClassifyError::Unavailable(re.to_string());
            }
        }
        cur = err.source();
    }

    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("connection refused")
        || lower.contains("error trying to connect")
        || lower.contains("dns error")
        || lower.contains("401")
        || lower.contains("unauthorized")
    {
        error!(error = %msg, "Classifier endpoint unreachable");
        ClassifyError::Unavailable(msg)
    } else {
        ClassifyError::Rejected(msg)
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(alias = "sentiment")]
    label: String,
    #[serde(default, alias = "confidence")]
    score: Option<f64>,
}

/// Parse the model's JSON verdict, tolerating code fences and chatter.
pub fn parse_verdict(response: &str) -> Result<Classification, ClassifyError> {
    let start = response.find('{');
    let end = response.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        (Some(s), _) => &response[s..],
        _ => {
            return Err(ClassifyError::Malformed(truncate_for_log(response, 200)));
        }
    };

    let verdict: Verdict = serde_json::from_str(json).map_err(|e| {
        if looks_truncated(&e) {
            warn!(error = %e, "Verdict JSON looks truncated");
        }
        ClassifyError::Malformed(format!("{e}: {}", truncate_for_log(json, 200)))
    })?;

    let label: Sentiment = verdict
        .label
        .parse()
        .map_err(|e: crate::models::UnknownSentiment| ClassifyError::Malformed(e.to_string()))?;
    let score = verdict.score.filter(|s| s.is_finite()).map(|s| s.clamp(0.0, 1.0));
    Ok(Classification { label, score })
}
