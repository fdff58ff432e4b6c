//! Command-line interface definitions for the news sentiment report.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most arguments can also be provided via environment variables.

use crate::outputs::locale::Language;
use clap::{Parser, ValueEnum};

/// Where articles are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// NewsAPI `/v2/everything` (requires `--newsapi-key`)
    Newsapi,
    /// Google News RSS search feed
    #[default]
    GoogleNews,
}

/// How article sentiment is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ClassifierKind {
    /// Chat model reached through an awful_aj config and template
    Llm,
    /// Built-in financial news lexicon, works offline
    #[default]
    Lexicon,
}

/// Command-line arguments for one report run.
///
/// # Examples
///
/// ```sh
/// # Built-in topic, offline lexicon scoring
/// news_sentiment_report --topic "US Tariffs" -j ./json -m ./markdown
///
/// # NewsAPI search, chat-model scoring, Korean report
/// news_sentiment_report --topic Inflation --source newsapi --newsapi-key KEY \
///     --classifier llm --language korean -j ./json -m ./markdown
///
/// # Show the configured topics
/// news_sentiment_report --list-topics
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to analyze (a name from the topic table)
    #[arg(short, long, env = "NEWS_TOPIC", required_unless_present = "list_topics")]
    pub topic: Option<String>,

    /// Language of the rendered report
    #[arg(short, long, value_enum, default_value_t = Language::English)]
    pub language: Language,

    /// Print the available topics and exit
    #[arg(long)]
    pub list_topics: bool,

    /// YAML topic table replacing the built-in one
    #[arg(long, env = "NEWS_TOPICS_FILE")]
    pub topics_file: Option<String>,

    /// Output directory for the JSON report bundle
    #[arg(short, long, default_value = "./json")]
    pub json_output_dir: String,

    /// Output directory for the Markdown report
    #[arg(short, long, default_value = "./markdown")]
    pub markdown_output_dir: String,

    /// News source to search
    #[arg(long, value_enum, default_value_t = SourceKind::GoogleNews)]
    pub source: SourceKind,

    /// NewsAPI key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    /// Articles requested per NewsAPI search (1-100)
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    /// Sentiment classifier
    #[arg(long, value_enum, default_value_t = ClassifierKind::Lexicon)]
    pub classifier: ClassifierKind,

    /// Optional path to the awful_aj config.yaml (llm classifier only)
    #[arg(short, long)]
    pub config: Option<String>,

    /// awful_aj template name (llm classifier only)
    #[arg(long, default_value = "news_sentiment")]
    pub template: String,

    /// Seconds allowed for the news fetch and for each classification
    #[arg(long, default_value_t = 20)]
    pub timeout_secs: u64,

    /// Classifications in flight at once
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Articles shown per sentiment before the rest are collapsed
    #[arg(long, default_value_t = 3)]
    pub max_visible: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "news_sentiment_report",
            "--topic",
            "US Tariffs",
            "--json-output-dir",
            "./json",
            "--markdown-output-dir",
            "./markdown",
        ]);

        assert_eq!(cli.topic.as_deref(), Some("US Tariffs"));
        assert_eq!(cli.json_output_dir, "./json");
        assert_eq!(cli.markdown_output_dir, "./markdown");
        assert_eq!(cli.source, SourceKind::GoogleNews);
        assert_eq!(cli.classifier, ClassifierKind::Lexicon);
        assert_eq!(cli.language, Language::English);
        assert_eq!(cli.timeout_secs, 20);
        assert_eq!(cli.concurrency, 8);
        assert_eq!(cli.max_visible, 3);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_sentiment_report",
            "-t",
            "Inflation",
            "-l",
            "spanish",
            "-j",
            "/tmp/json",
            "-m",
            "/tmp/markdown",
        ]);

        assert_eq!(cli.json_output_dir, "/tmp/json");
        assert_eq!(cli.markdown_output_dir, "/tmp/markdown");
        assert_eq!(cli.language, Language::Spanish);
    }

    #[test]
    fn test_cli_value_enums() {
        let cli = Cli::parse_from([
            "news_sentiment_report",
            "--topic",
            "Inflation",
            "--source",
            "newsapi",
            "--classifier",
            "llm",
        ]);
        assert_eq!(cli.source, SourceKind::Newsapi);
        assert_eq!(cli.classifier, ClassifierKind::Llm);
    }

    #[test]
    fn test_list_topics_needs_no_topic() {
        let cli = Cli::try_parse_from(["news_sentiment_report", "--list-topics"]).unwrap();
        assert!(cli.list_topics);
        assert!(cli.topic.is_none());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let res = Cli::try_parse_from(["news_sentiment_report", "--topic", "x", "--concurrency", "0"]);
        assert!(res.is_err());
    }
}
