//! Short narrative synthesis for one sentiment bucket.
//!
//! The synthesis is extractive and deterministic: it states how much
//! coverage carried the target tone and how strong it was, names the topic
//! keywords that recur across those articles, and quotes the most confident
//! headline. The same input always yields the same text.

use crate::aggregate::rank_by_score;
use crate::filter::matched_keywords;
use crate::models::{ScoredArticle, Sentiment};
use crate::utils::truncate_for_display;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Keyword anchors named in the theme sentence.
const MAX_THEMES: usize = 3;

/// Length limit when an untitled article's description stands in for its headline.
const MAX_HEADLINE_CHARS: usize = 120;

/// Fixed sentence used when no article carries the target label.
pub fn no_coverage(sentiment: Sentiment) -> String {
    format!(
        "No {} coverage was found for this topic in the current news cycle.",
        sentiment.label().to_lowercase()
    )
}

fn tone_band(mean_score: f64) -> &'static str {
    if mean_score >= 0.8 {
        "strongly"
    } else if mean_score >= 0.6 {
        "moderately"
    } else {
        "mildly"
    }
}

/// `["a"]` -> `a`, `["a", "b"]` -> `a and b`, `["a", "b", "c"]` -> `a, b and c`.
fn join_list(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

/// Topic keywords ordered by how many of `articles` mention them.
///
/// Ties are broken alphabetically; keywords nobody mentions are left out.
pub fn recurring_themes(articles: &[&ScoredArticle], keywords: &BTreeSet<String>) -> Vec<(String, usize)> {
    let mut hits: BTreeMap<&str, usize> = BTreeMap::new();
    for article in articles {
        let text = format!("{} {}", article.title, article.description);
        for keyword in matched_keywords(&text, keywords) {
            *hits.entry(keyword).or_default() += 1;
        }
    }
    let mut themes: Vec<(String, usize)> = hits.into_iter().map(|(k, n)| (k.to_string(), n)).collect();
    // BTreeMap iteration is alphabetical and the sort is stable
    themes.sort_by(|a, b| b.1.cmp(&a.1));
    themes
}

/// Summarize the articles labelled `sentiment` in one to three sentences.
///
/// Never returns an empty string: with no matching article the fixed
/// [`no_coverage`] sentence is returned instead.
///
/// # Arguments
///
/// * `articles` - Classified articles, ranked by score
/// * `sentiment` - The label to summarize
/// * `keywords` - Topic keywords used for the recurring-themes sentence
#[instrument(level = "debug", skip(articles, keywords), fields(count = articles.len()))]
pub fn summarize_by_sentiment(
    articles: &[ScoredArticle],
    sentiment: Sentiment,
    keywords: &BTreeSet<String>,
) -> String {
    let matching: Vec<&ScoredArticle> = articles.iter().filter(|a| a.sentiment == sentiment).collect();
    if matching.is_empty() {
        return no_coverage(sentiment);
    }

    let n = matching.len();
    let mean = matching.iter().map(|a| a.rank_score()).sum::<f64>() / n as f64;
    let mut sentences = vec![format!(
        "{} {} carried a {} {} tone (average confidence {:.2}).",
        n,
        if n == 1 { "article" } else { "articles" },
        tone_band(mean),
        sentiment.label().to_lowercase(),
        mean
    )];

    let themes = recurring_themes(&matching, keywords);
    if themes.is_empty() {
        sentences.push("None of the topic keywords anchored this coverage.".to_string());
    } else {
        let named: Vec<String> = themes
            .iter()
            .take(MAX_THEMES)
            .map(|(k, count)| format!("\"{k}\" ({count})"))
            .collect();
        sentences.push(format!("Recurring themes were {}.", join_list(&named)));
    }

    let mut ranked: Vec<ScoredArticle> = matching.into_iter().cloned().collect();
    rank_by_score(&mut ranked);
    if let Some(lead) = ranked.first() {
        let headline = if lead.title.trim().is_empty() {
            truncate_for_display(lead.description.trim(), MAX_HEADLINE_CHARS)
        } else {
            lead.title.trim().to_string()
        };
        if !headline.is_empty() {
            let source = lead.source.trim();
            if source.is_empty() {
                sentences.push(format!("The leading headline was \"{headline}\"."));
            } else {
                sentences.push(format!("The leading headline was \"{headline}\" ({source})."));
            }
        }
    }

    let summary = sentences.join(" ");
    debug!(%sentiment, chars = summary.len(), "Synthesized insight");
    summary
}
