//! Tally and rank classified articles.

use crate::models::{ScoredArticle, Sentiment, SentimentCounts};
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Counts plus the two ranked polarity groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub counts: SentimentCounts,
    /// Positive articles, score descending, ties in input order.
    pub positive: Vec<ScoredArticle>,
    /// Negative articles, score descending, ties in input order.
    pub negative: Vec<ScoredArticle>,
}

/// Sort by score descending. `sort_by` is stable, so ties keep input order.
pub fn rank_by_score(articles: &mut [ScoredArticle]) {
    articles.sort_by(|a, b| {
        b.rank_score()
            .partial_cmp(&a.rank_score())
            .unwrap_or(Ordering::Equal)
    });
}

/// Count every article by label and split out the ranked polarity groups.
///
/// Neutral articles only contribute to the counts.
#[instrument(level = "debug", skip_all, fields(count = articles.len()))]
pub fn aggregate(articles: &[ScoredArticle]) -> Aggregate {
    let mut out = Aggregate::default();
    for article in articles {
        out.counts.record(article.sentiment);
        match article.sentiment {
            Sentiment::Positive => out.positive.push(article.clone()),
            Sentiment::Negative => out.negative.push(article.clone()),
            Sentiment::Neutral => {}
        }
    }
    rank_by_score(&mut out.positive);
    rank_by_score(&mut out.negative);
    debug!(
        positive = out.counts.positive,
        neutral = out.counts.neutral,
        negative = out.counts.negative,
        "Aggregated sentiment"
    );
    out
}
