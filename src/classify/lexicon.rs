//! Offline lexicon classifier tuned for economic news.
//!
//! Each word (or two-word phrase) in the lexicon carries a valence. The
//! valences found in the text are summed, flipped when one of the two
//! preceding words is a negator ("no", "not", "without", ...), and squashed
//! into a compound score in `(-1, 1)` the way VADER normalizes its sum.
//!
//! Compound scores inside [`NEUTRAL_BAND`] are labelled NEUTRAL. The
//! reported score is the classifier's confidence in its label, in `[0.5, 1)`.

use super::Classify;
use crate::error::ClassifyError;
use crate::models::{Classification, Sentiment};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Compound scores with an absolute value below this are NEUTRAL.
pub const NEUTRAL_BAND: f64 = 0.25;

/// Normalization constant for `sum / sqrt(sum^2 + ALPHA)`.
const ALPHA: f64 = 4.0;

const POSITIVE_TERMS: &[(&str, f64)] = &[
    ("gain", 1.0),
    ("gains", 1.0),
    ("growth", 1.0),
    ("grows", 1.0),
    ("boost", 1.2),
    ("boosts", 1.2),
    ("surge", 1.4),
    ("surges", 1.4),
    ("rally", 1.4),
    ("rallies", 1.4),
    ("soar", 1.6),
    ("soars", 1.6),
    ("rebound", 1.2),
    ("rebounds", 1.2),
    ("recovery", 1.1),
    ("recovers", 1.1),
    ("strong", 1.0),
    ("stronger", 1.0),
    ("robust", 1.1),
    ("resilient", 1.1),
    ("optimism", 1.3),
    ("optimistic", 1.3),
    ("upbeat", 1.2),
    ("improve", 1.0),
    ("improves", 1.0),
    ("improved", 1.0),
    ("beat", 0.9),
    ("beats", 0.9),
    ("record", 0.6),
    ("profit", 0.9),
    ("profits", 0.9),
    ("hiring", 0.7),
    ("ease", 0.8),
    ("eases", 0.8),
    ("easing", 0.8),
    ("cools", 0.6),
    ("deal", 0.7),
    ("agreement", 0.8),
    ("truce", 1.0),
    ("relief", 1.2),
    ("stable", 0.6),
    ("stabilize", 0.8),
    ("stabilizes", 0.8),
    ("upgrade", 1.1),
    ("win", 1.0),
    ("wins", 1.0),
    ("good", 1.0),
    ("positive", 1.0),
    ("success", 1.2),
    ("successful", 1.2),
    ("opportunity", 0.8),
    ("confidence", 0.9),
];

const NEGATIVE_TERMS: &[(&str, f64)] = &[
    ("loss", -1.0),
    ("losses", -1.0),
    ("fall", -1.0),
    ("falls", -1.0),
    ("drop", -1.0),
    ("drops", -1.0),
    ("decline", -1.0),
    ("declines", -1.0),
    ("slump", -1.3),
    ("slumps", -1.3),
    ("plunge", -1.6),
    ("plunges", -1.6),
    ("crash", -1.8),
    ("crashes", -1.8),
    ("tumble", -1.4),
    ("tumbles", -1.4),
    ("recession", -1.6),
    ("downturn", -1.4),
    ("slowdown", -1.1),
    ("weak", -1.0),
    ("weaker", -1.0),
    ("weakens", -1.0),
    ("fear", -1.2),
    ("fears", -1.2),
    ("worry", -1.1),
    ("worries", -1.1),
    ("concern", -0.9),
    ("concerns", -0.9),
    ("risk", -0.7),
    ("risks", -0.7),
    ("uncertainty", -1.0),
    ("volatile", -0.9),
    ("volatility", -0.9),
    ("escalate", -1.1),
    ("escalates", -1.1),
    ("escalation", -1.1),
    ("retaliation", -1.2),
    ("retaliatory", -1.2),
    ("war", -1.2),
    ("crisis", -1.7),
    ("default", -1.4),
    ("layoffs", -1.3),
    ("cuts", -0.6),
    ("shortage", -1.1),
    ("soaring", -0.4),
    ("warn", -1.0),
    ("warns", -1.0),
    ("warning", -1.0),
    ("threat", -1.1),
    ("threatens", -1.1),
    ("pressure", -0.7),
    ("struggle", -1.1),
    ("struggles", -1.1),
    ("bad", -1.0),
    ("negative", -1.0),
    ("sell-off", -1.4),
    ("selloff", -1.4),
    ("bankruptcy", -1.8),
    ("downgrade", -1.2),
];

const PHRASES: &[(&str, f64)] = &[
    ("trade war", -1.6),
    ("rate cut", 0.9),
    ("rate hike", -0.8),
    ("job cuts", -1.4),
    ("all-time high", 1.5),
    ("record high", 1.4),
    ("record low", -1.0),
    ("soft landing", 1.3),
    ("hard landing", -1.3),
    ("cost of living", -0.6),
];

const NEGATORS: &[&str] = &[
    "no", "not", "never", "without", "isn't", "aren't", "wasn't", "won't", "don't", "doesn't",
    "didn't", "fails", "failed", "hardly", "barely",
];

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+(?:['-][a-z0-9]+)*").expect("valid regex"));

static TERMS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    POSITIVE_TERMS
        .iter()
        .chain(NEGATIVE_TERMS)
        .chain(PHRASES)
        .copied()
        .collect()
});

/// Finance-tuned keyword lexicon classifier. Needs no network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Compound valence of `text` in `(-1, 1)`, or `None` if it has no words.
    pub fn compound(&self, text: &str) -> Option<f64> {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN.find_iter(&lower).map(|m| m.as_str()).collect();
        if tokens.is_empty() {
            return None;
        }

        let mut sum = 0.0;
        let mut i = 0;
        while i < tokens.len() {
            let (valence, width) = match tokens.get(i + 1) {
                Some(next) => match TERMS.get(format!("{} {}", tokens[i], next).as_str()) {
                    Some(v) => (*v, 2),
                    None => (TERMS.get(tokens[i]).copied().unwrap_or(0.0), 1),
                },
                None => (TERMS.get(tokens[i]).copied().unwrap_or(0.0), 1),
            };
            if valence != 0.0 {
                let negated = tokens[i.saturating_sub(2)..i]
                    .iter()
                    .any(|t| NEGATORS.contains(t));
                sum += if negated { -0.75 * valence } else { valence };
            }
            i += width;
        }

        Some(sum / (sum * sum + ALPHA).sqrt())
    }
}

impl Classify for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        let compound = self
            .compound(text)
            .ok_or_else(|| ClassifyError::Rejected("no words to classify".to_string()))?;

        let classification = if compound >= NEUTRAL_BAND {
            Classification::new(Sentiment::Positive, 0.5 + compound / 2.0)
        } else if compound <= -NEUTRAL_BAND {
            Classification::new(Sentiment::Negative, 0.5 - compound / 2.0)
        } else {
            Classification::new(Sentiment::Neutral, 1.0 - compound.abs() * 2.0)
        };
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn label(text: &str) -> Sentiment {
        LexiconClassifier::new().classify(text).await.unwrap().label
    }

    #[tokio::test]
    async fn test_positive_headlines() {
        for headline in [
            "Stocks rally as inflation eases",
            "Hiring surges, showing a resilient labor market",
            "Trade deal brings relief to exporters",
            "Economists see soft landing after rate cut",
        ] {
            assert_eq!(label(headline).await, Sentiment::Positive, "{headline}");
        }
    }

    #[tokio::test]
    async fn test_negative_headlines() {
        for headline in [
            "Tariffs rise. trade war escalates",
            "Markets plunge on recession fears",
            "Oil prices tumble as demand worries grow",
            "Company announces layoffs amid downturn",
        ] {
            assert_eq!(label(headline).await, Sentiment::Negative, "{headline}");
        }
    }

    #[tokio::test]
    async fn test_neutral_headline() {
        assert_eq!(
            label("Federal Reserve publishes meeting minutes on Wednesday").await,
            Sentiment::Neutral
        );
    }

    #[test]
    fn test_negation_flips_valence() {
        let clf = LexiconClassifier::new();
        let plain = clf.compound("the economy shows growth").unwrap();
        let negated = clf.compound("the economy shows no growth").unwrap();
        assert!(plain > 0.0);
        assert!(negated < 0.0);
    }

    #[tokio::test]
    async fn test_scores_are_confidences() {
        let clf = LexiconClassifier::new();
        for text in ["markets crash", "markets soar", "markets open", "soar crash"] {
            let c = clf.classify(text).await.unwrap();
            let score = c.score.unwrap();
            assert!((0.5..=1.0).contains(&score), "{text}: {score}");
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let err = LexiconClassifier::new().classify("  ... ").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Rejected(_)));
        assert!(!err.is_systemic());
    }
}
