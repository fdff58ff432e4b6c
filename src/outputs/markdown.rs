//! Markdown rendering of a [`ReportBundle`].
//!
//! The page has a fixed layout in every language:
//!
//! 1. Title, date and topic line
//! 2. Executive summary
//! 3. Sentiment breakdown table with text bars (Positive, Neutral, Negative)
//! 4. Ranked positive and negative coverage; the first `max_visible`
//!    articles are shown, the rest collapse into a `<details>` block
//! 5. The narrative, verbatim
//!
//! A failed run renders a distinct page via [`render_failure`] so that an
//! outage is never mistaken for a quiet news day.

use super::locale::{Language, LocaleText};
use crate::models::{ReportBundle, ScoredArticle, Sentiment, SentimentCounts};
use crate::utils::slugify_title;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Width of a full bar in the sentiment chart.
const BAR_WIDTH: usize = 20;

fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn bar(count: usize, total: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * BAR_WIDTH as f64).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)))
}

fn write_title_block(md: &mut String, text: &LocaleText, topic: &str, date: DateTime<Utc>) {
    writeln!(md, "# {}\n", text.header).unwrap();
    writeln!(
        md,
        "**{}:** {} | **{}:** {}\n",
        text.date_label,
        date.format(text.date_format),
        text.topic_label,
        topic
    )
    .unwrap();
}

/// Sentiment breakdown table, always in Positive, Neutral, Negative order.
pub fn render_chart(counts: &SentimentCounts, text: &LocaleText) -> String {
    let mut md = String::new();
    let total = counts.total();
    writeln!(
        md,
        "| {} | {} | {} | |",
        text.chart_sentiment_column, text.chart_count_column, text.chart_share_column
    )
    .unwrap();
    writeln!(md, "|---|---:|---:|---|").unwrap();
    for (sentiment, count) in counts.iter() {
        let share = if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        };
        writeln!(
            md,
            "| {} | {} | {:.1}% | `{}` |",
            text.sentiment(sentiment),
            count,
            share,
            bar(count, total)
        )
        .unwrap();
    }
    md
}

fn write_article(md: &mut String, article: &ScoredArticle, text: &LocaleText) {
    writeln!(md, "**{}:** {}  ", text.source_label, one_line(&article.source)).unwrap();
    writeln!(md, "**{}:** {}  ", text.title_label, one_line(&article.title)).unwrap();
    writeln!(md, "**{}:** {}\n", text.summary_label, one_line(&article.description)).unwrap();
    writeln!(md, "---\n").unwrap();
}

/// One polarity's ranked list: the top `max_visible`, the remainder collapsed.
pub fn render_news_section(
    sentiment: Sentiment,
    articles: &[ScoredArticle],
    max_visible: usize,
    text: &LocaleText,
) -> String {
    let (empty, view_more) = match sentiment {
        Sentiment::Negative => (text.no_negative, text.view_more_negative),
        _ => (text.no_positive, text.view_more_positive),
    };
    let mut md = String::new();
    if articles.is_empty() {
        writeln!(md, "{empty}\n").unwrap();
        return md;
    }

    let split = max_visible.min(articles.len());
    let (visible, hidden) = articles.split_at(split);
    for article in visible {
        write_article(&mut md, article, text);
    }
    if !hidden.is_empty() {
        writeln!(md, "<details>\n<summary>{view_more} ({})</summary>\n", hidden.len()).unwrap();
        for article in hidden {
            write_article(&mut md, article, text);
        }
        writeln!(md, "</details>\n").unwrap();
    }
    md
}

/// Render the full report page.
///
/// # Arguments
///
/// * `bundle` - The finished report
/// * `language` - Language of the headings and labels
/// * `max_visible` - Articles listed per polarity before the rest are collapsed
///
/// # Returns
///
/// The complete Markdown document.
pub fn render_report(bundle: &ReportBundle, language: Language, max_visible: usize) -> String {
    let text = language.text();
    let mut md = String::new();

    write_title_block(&mut md, text, &bundle.topic, bundle.generated_at);
    writeln!(md, "{}\n", text.executive_summary).unwrap();

    writeln!(md, "{}\n", text.sentiment_chart).unwrap();
    md.push_str(&render_chart(&bundle.counts, text));
    writeln!(
        md,
        "\n_{}: {} · {}: {} · {}: {}_\n",
        text.analyzed_label,
        bundle.counts.total(),
        text.filtered_label,
        bundle.filtered_out,
        text.dropped_label,
        bundle.dropped
    )
    .unwrap();

    writeln!(md, "{}\n", text.key_highlights).unwrap();
    writeln!(md, "{}\n", text.positive_title).unwrap();
    md.push_str(&render_news_section(Sentiment::Positive, &bundle.positive, max_visible, text));
    writeln!(md, "{}\n", text.negative_title).unwrap();
    md.push_str(&render_news_section(Sentiment::Negative, &bundle.negative, max_visible, text));

    writeln!(md, "{}\n", text.expert_insight).unwrap();
    writeln!(md, "{}\n", bundle.narrative).unwrap();

    writeln!(md, "---\n").unwrap();
    writeln!(md, "{}", text.footer).unwrap();
    md
}

/// Render the page shown when a run fails.
pub fn render_failure(topic: &str, language: Language, error: &str, at: DateTime<Utc>) -> String {
    let text = language.text();
    let mut md = String::new();
    write_title_block(&mut md, text, topic, at);
    writeln!(md, "{}\n", text.failure_title).unwrap();
    writeln!(md, "{}\n", text.failure_body).unwrap();
    writeln!(md, "> {}\n", one_line(error)).unwrap();
    writeln!(md, "---\n").unwrap();
    writeln!(md, "{}", text.footer).unwrap();
    md
}

/// Write rendered Markdown to `{markdown_output_dir}/{date}_{topic-slug}.md`.
///
/// Returns the path written.
#[instrument(level = "info", skip(markdown), fields(bytes = markdown.len()))]
pub async fn write_markdown(
    markdown: &str,
    markdown_output_dir: &str,
    topic: &str,
    at: DateTime<Utc>,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(markdown_output_dir).await?;
    let path = format!(
        "{}/{}_{}.md",
        markdown_output_dir.trim_end_matches('/'),
        at.date_naive(),
        slugify_title(topic)
    );
    fs::write(&path, markdown).await?;
    info!(%path, "Wrote Markdown report");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::compose_narrative;
    use chrono::TimeZone;

    fn article(source: &str, sentiment: Sentiment, score: f64) -> ScoredArticle {
        ScoredArticle {
            source: source.to_string(),
            title: format!("{source} headline"),
            description: format!("{source}\nsummary"),
            sentiment,
            score: Some(score),
        }
    }

    fn bundle() -> ReportBundle {
        ReportBundle {
            topic: "US Tariffs".to_string(),
            search_term: "US tariffs".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap(),
            counts: SentimentCounts {
                positive: 4,
                neutral: 2,
                negative: 2,
            },
            positive: vec![
                article("P1", Sentiment::Positive, 0.9),
                article("P2", Sentiment::Positive, 0.8),
                article("P3", Sentiment::Positive, 0.7),
                article("P4", Sentiment::Positive, 0.6),
            ],
            negative: vec![
                article("N1", Sentiment::Negative, 0.9),
                article("N2", Sentiment::Negative, 0.5),
            ],
            narrative: compose_narrative("good things", "bad things"),
            filtered_out: 3,
            dropped: 1,
        }
    }

    #[test]
    fn test_report_layout_english() {
        let md = render_report(&bundle(), Language::English, 3);
        assert!(md.starts_with("# 📊 News Sentiment Report\n"));
        assert!(md.contains("**Date:** October 17, 2026 | **Topic:** US Tariffs"));
        assert!(md.contains("| Positive | 4 | 50.0% |"));
        assert!(md.contains("| Neutral | 2 | 25.0% |"));
        assert!(md.contains("**Summary:** P1 summary"));
        assert!(md.contains("<summary>View more positive news (1)</summary>"));
        assert!(!md.contains("View more negative news"));
        assert!(md.contains("✅ **Positive Insight**\n\ngood things\n\n❗ **Negative Insight**\n\nbad things"));

        let pos = md.find("### ✅ Positive Coverage").unwrap();
        let neg = md.find("### ⚠️ Negative Coverage").unwrap();
        let p4 = md.find("P4 headline").unwrap();
        assert!(pos < p4 && p4 < neg);
    }

    #[test]
    fn test_chart_order_and_bars() {
        let chart = render_chart(&bundle().counts, Language::English.text());
        let rows: Vec<_> = chart.lines().skip(2).collect();
        assert!(rows[0].starts_with("| Positive"));
        assert!(rows[1].starts_with("| Neutral"));
        assert!(rows[2].starts_with("| Negative"));
        assert!(rows[0].contains(&format!("`{}{}`", "█".repeat(10), "░".repeat(10))));
    }

    #[test]
    fn test_empty_report_renders_no_news() {
        let mut b = bundle();
        b.counts = SentimentCounts::default();
        b.positive.clear();
        b.negative.clear();
        let md = render_report(&b, Language::English, 3);
        assert!(md.contains("_No positive news found._"));
        assert!(md.contains("_No negative news found._"));
        assert!(md.contains("| Positive | 0 | 0.0% |"));
        assert!(!md.contains("Could not retrieve news"));
    }

    #[test]
    fn test_report_localized() {
        let md = render_report(&bundle(), Language::Korean, 3);
        assert!(md.contains("뉴스 감정 분석 리포트"));
        assert!(md.contains("2026년 10월 17일"));
        assert!(md.contains("| 긍정 | 4 |"));

        let md = render_report(&bundle(), Language::Spanish, 10);
        assert!(md.contains("**Fecha:** 17/10/2026"));
        assert!(!md.contains("<details>"));
    }

    #[test]
    fn test_failure_page_is_distinct() {
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let md = render_failure("US Tariffs", Language::English, "timed out\nafter 20s", at);
        assert!(md.contains("## ⛔ Could not retrieve news"));
        assert!(md.contains("> timed out after 20s"));
        assert!(!md.contains("Sentiment Breakdown"));
    }

    #[tokio::test]
    async fn test_write_markdown_path() {
        let dir = std::env::temp_dir().join(format!("nsr-md-{}", std::process::id()));
        let dir_str = dir.to_str().unwrap().to_string();
        let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let path = write_markdown("# hi\n", &dir_str, "US Tariffs", at).await.unwrap();
        assert!(path.ends_with("2026-10-17_us-tariffs.md"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi\n");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
