//! Relevance filtering of raw search results.
//!
//! Search APIs return noisy results: syndicated copies of the same story,
//! placeholder entries, and articles that only mention the search term in
//! passing. [`dedupe_articles`] removes repeats and [`filter_articles`] keeps
//! only articles that mention one of the topic's keywords.

use crate::models::RawArticle;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn normalized_title(title: &str) -> String {
    WHITESPACE.replace_all(title.trim(), " ").to_lowercase()
}

/// Drop empty articles and later copies of an already-seen headline.
///
/// Headlines are compared after lower-casing and collapsing whitespace.
/// The first occurrence wins and input order is preserved.
///
/// # Arguments
///
/// * `articles` - Articles as returned by the news source
///
/// # Returns
///
/// The articles that have a title or description, without repeated headlines.
#[instrument(level = "debug", skip_all, fields(input = articles.len()))]
pub fn dedupe_articles(articles: Vec<RawArticle>) -> Vec<RawArticle> {
    let kept: Vec<RawArticle> = articles
        .into_iter()
        .filter(|a| !(a.title.trim().is_empty() && a.description.trim().is_empty()))
        .unique_by(|a| {
            let title = normalized_title(&a.title);
            if title.is_empty() {
                // untitled articles are keyed by their description instead
                format!("\u{0}{}", normalized_title(&a.description))
            } else {
                title
            }
        })
        .collect();
    debug!(kept = kept.len(), "Deduplicated articles");
    kept
}

/// Keep articles whose title or description contains at least one keyword.
///
/// Matching is a case-insensitive substring test. An empty keyword set
/// places no restriction, so every article is kept. Input order is preserved.
///
/// # Arguments
///
/// * `articles` - Candidate articles, usually already deduplicated
/// * `keywords` - The topic's keyword set
///
/// # Returns
///
/// The relevant subset of `articles`.
#[instrument(level = "debug", skip_all, fields(input = articles.len(), keywords = keywords.len()))]
pub fn filter_articles(articles: Vec<RawArticle>, keywords: &BTreeSet<String>) -> Vec<RawArticle> {
    if keywords.is_empty() {
        return articles;
    }
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if needles.is_empty() {
        return articles;
    }

    let kept: Vec<RawArticle> = articles
        .into_iter()
        .filter(|a| {
            let title = a.title.to_lowercase();
            let description = a.description.to_lowercase();
            needles
                .iter()
                .any(|k| title.contains(k.as_str()) || description.contains(k.as_str()))
        })
        .collect();
    debug!(kept = kept.len(), "Keyword filter applied");
    kept
}

/// Keywords from `keywords` that appear in `text` (case-insensitive).
pub fn matched_keywords<'a>(text: &str, keywords: &'a BTreeSet<String>) -> Vec<&'a str> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| !k.is_empty() && haystack.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect()
}
