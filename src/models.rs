//! Data models for articles, sentiment labels and the finished report.
//!
//! This module defines the values that flow through one analysis run:
//! - [`RawArticle`]: an article as returned by a news source
//! - [`Sentiment`] and [`Classification`]: what the classifier says about it
//! - [`ScoredArticle`]: a raw article joined with its classification
//! - [`SentimentCounts`]: the per-label tally shown in the chart
//! - [`ReportBundle`]: everything the presentation layer needs for one run
//!
//! Nothing here is persisted between runs. A bundle is built fresh by
//! [`crate::report::analyze_topic`] and handed back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A news article as returned by a news source.
///
/// Sources fill missing fields with empty strings, so every field is
/// always present even when the upstream API omitted it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct RawArticle {
    /// Publisher name (e.g. "Reuters").
    pub source: String,
    /// Headline.
    pub title: String,
    /// Short description or lede.
    pub description: String,
}

impl RawArticle {
    pub fn new(source: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Sentiment label assigned by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Display order used by the chart and the counts table.
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Capitalized label, e.g. `"Positive"`.
    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Negative => "NEGATIVE",
        };
        f.write_str(s)
    }
}

/// Error returned when a label string is not a known sentiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSentiment(pub String);

impl fmt::Display for UnknownSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sentiment label: {:?}", self.0)
    }
}

impl std::error::Error for UnknownSentiment {}

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    /// Parse a classifier label.
    ///
    /// Accepts the full names in any case, the common `pos`/`neu`/`neg`
    /// abbreviations, and the `LABEL_0`/`LABEL_1`/`LABEL_2` ids emitted by
    /// three-class sentiment models (negative, neutral, positive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Ok(Sentiment::Positive),
            "neutral" | "neu" | "label_1" => Ok(Sentiment::Neutral),
            "negative" | "neg" | "label_0" => Ok(Sentiment::Negative),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

/// Output of a single classifier call.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Classification {
    pub label: Sentiment,
    /// Confidence in `[0, 1]`. `None` when the classifier gave no score.
    pub score: Option<f64>,
}

impl Classification {
    pub fn new(label: Sentiment, score: f64) -> Self {
        Self {
            label,
            score: Some(score),
        }
    }
}

/// A raw article joined with its classification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredArticle {
    pub source: String,
    pub title: String,
    pub description: String,
    pub sentiment: Sentiment,
    pub score: Option<f64>,
}

impl ScoredArticle {
    pub fn new(article: RawArticle, classification: Classification) -> Self {
        Self {
            source: article.source,
            title: article.title,
            description: article.description,
            sentiment: classification.label,
            score: classification.score.map(|s| s.clamp(0.0, 1.0)),
        }
    }

    /// Score used for ranking; a missing or non-finite score ranks as `0.0`.
    pub fn rank_score(&self) -> f64 {
        match self.score {
            Some(s) if s.is_finite() => s.clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Per-label article tally, always iterated Positive, Neutral, Negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// `(label, count)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Sentiment, usize)> + '_ {
        Sentiment::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

/// Everything produced by one analysis run.
///
/// The bundle is a plain value: the caller decides how long to keep it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportBundle {
    /// Topic name as configured (e.g. "US Tariffs").
    pub topic: String,
    /// Search term that was sent to the news source.
    pub search_term: String,
    pub generated_at: DateTime<Utc>,
    pub counts: SentimentCounts,
    /// Positive articles, highest score first.
    pub positive: Vec<ScoredArticle>,
    /// Negative articles, highest score first.
    pub negative: Vec<ScoredArticle>,
    /// Positive and negative insight sections joined with fixed headers.
    pub narrative: String,
    /// Articles fetched but discarded as duplicates or keyword misses.
    pub filtered_out: usize,
    /// Articles whose classification failed and were left out of the counts.
    pub dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse_variants() {
        assert_eq!("POSITIVE".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("negative".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!(" Neutral ".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert_eq!("neg".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("LABEL_2".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!("LABEL_0".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert!("bullish".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_sentiment_serializes_uppercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"NEGATIVE\"");
        let back: Sentiment = serde_json::from_str("\"POSITIVE\"").unwrap();
        assert_eq!(back, Sentiment::Positive);
    }

    #[test]
    fn test_rank_score_defaults_missing_to_zero() {
        let article = ScoredArticle {
            source: "A".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            sentiment: Sentiment::Positive,
            score: None,
        };
        assert_eq!(article.rank_score(), 0.0);

        let nan = ScoredArticle {
            score: Some(f64::NAN),
            ..article.clone()
        };
        assert_eq!(nan.rank_score(), 0.0);
    }

    #[test]
    fn test_scored_article_clamps_score() {
        let article = ScoredArticle::new(
            RawArticle::new("A", "t", "d"),
            Classification::new(Sentiment::Positive, 1.7),
        );
        assert_eq!(article.score, Some(1.0));
    }

    #[test]
    fn test_counts_iterate_in_display_order() {
        let mut counts = SentimentCounts::default();
        counts.record(Sentiment::Negative);
        counts.record(Sentiment::Positive);
        counts.record(Sentiment::Negative);

        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(
            pairs,
            vec![
                (Sentiment::Positive, 1),
                (Sentiment::Neutral, 0),
                (Sentiment::Negative, 2)
            ]
        );
        assert_eq!(counts.total(), 3);
    }
}
