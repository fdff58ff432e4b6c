//! # News Sentiment Report
//!
//! Searches the news for a configured topic, scores the sentiment of every
//! relevant article, and writes a ranked, summarized report as JSON and
//! Markdown.
//!
//! ## Usage
//!
//! ```sh
//! news_sentiment_report --topic "US Tariffs" -j ./json -m ./markdown
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Fetching**: Search a news source (Google News RSS or NewsAPI)
//! 2. **Filtering**: Drop duplicates and articles that miss every topic keyword
//! 3. **Classifying**: Score each article (offline lexicon or chat model, 8 at a time)
//! 4. **Aggregating**: Count labels and rank positive and negative coverage
//! 5. **Summarizing**: Write the positive and negative insight sections
//! 6. **Output**: Write the JSON bundle and the Markdown report
//!
//! A failed run removes that day's JSON bundle for the topic, writes a
//! "could not retrieve news" page in place of the report and exits non-zero.

use awful_aj::{config as aj_config, config_dir, template};
use chrono::Utc;
use clap::Parser;
use std::borrow::Cow;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod classify;
mod cli;
mod config;
mod error;
mod fetch;
mod filter;
mod models;
mod outputs;
mod report;
mod summarize;
mod utils;

use classify::lexicon::LexiconClassifier;
use classify::llm::{LlmClassifier, RetryClassify};
use classify::{Classify, ClassifyOptions};
use cli::{ClassifierKind, Cli, SourceKind};
use config::{TopicSetting, TopicTable};
use error::{ClassifyError, FetchError, PipelineError};
use fetch::ArticleSource;
use fetch::google_news::GoogleNewsSource;
use fetch::newsapi::NewsApiSource;
use models::{Classification, RawArticle, ReportBundle};
use outputs::{json, markdown};
use report::{RunOptions, analyze_topic};
use utils::ensure_writable_dir;

/// The news source selected on the command line.
enum NewsSource {
    NewsApi(NewsApiSource),
    GoogleNews(GoogleNewsSource),
}

impl ArticleSource for NewsSource {
    fn name(&self) -> &str {
        match self {
            NewsSource::NewsApi(s) => s.name(),
            NewsSource::GoogleNews(s) => s.name(),
        }
    }

    async fn fetch(&self, search_term: &str) -> Result<Vec<RawArticle>, FetchError> {
        match self {
            NewsSource::NewsApi(s) => s.fetch(search_term).await,
            NewsSource::GoogleNews(s) => s.fetch(search_term).await,
        }
    }
}

/// The classifier selected on the command line.
enum SentimentBackend {
    Lexicon(LexiconClassifier),
    Llm(RetryClassify<LlmClassifier>),
}

impl Classify for SentimentBackend {
    fn name(&self) -> &str {
        match self {
            SentimentBackend::Lexicon(c) => c.name(),
            SentimentBackend::Llm(c) => c.name(),
        }
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        match self {
            SentimentBackend::Lexicon(c) => c.classify(text).await,
            SentimentBackend::Llm(c) => c.classify(text).await,
        }
    }

    fn time_budget(&self, per_call: Duration) -> Duration {
        match self {
            SentimentBackend::Lexicon(c) => c.time_budget(per_call),
            SentimentBackend::Llm(c) => c.time_budget(per_call),
        }
    }
}

fn build_source(args: &Cli, timeout: Duration) -> Result<NewsSource, PipelineError> {
    let built = match args.source {
        SourceKind::Newsapi => NewsApiSource::new(args.newsapi_key.clone(), timeout)
            .map(|s| NewsSource::NewsApi(s.with_page_size(args.page_size))),
        SourceKind::GoogleNews => GoogleNewsSource::new(timeout).map(NewsSource::GoogleNews),
    };
    built.map_err(|error| PipelineError::Fetch {
        source_name: match args.source {
            SourceKind::Newsapi => "NewsAPI",
            SourceKind::GoogleNews => "Google News",
        }
        .to_string(),
        error,
    })
}

#[instrument(level = "info", skip(args), fields(classifier = ?args.classifier))]
async fn build_classifier(args: &Cli) -> Result<SentimentBackend, Box<dyn Error>> {
    match args.classifier {
        ClassifierKind::Lexicon => Ok(SentimentBackend::Lexicon(LexiconClassifier::new())),
        ClassifierKind::Llm => {
            let template = template::load_template(args.template.as_str()).await?;
            info!(template = %args.template, "Loaded template");

            let conf_file = match &args.config {
                Some(path) => PathBuf::from(path),
                None => config_dir()?.join("config.yaml"),
            };
            let config_path = conf_file.to_str().ok_or("config path is not valid UTF-8")?;
            let config = aj_config::load_config(config_path)?;
            info!(config_path, "Loaded configuration");

            let llm = LlmClassifier::new(config, template);
            let retry = RetryClassify::new(llm, 3, Duration::from_secs(1))
                .with_attempt_timeout(Duration::from_secs(args.timeout_secs));
            info!(budget = ?retry.budget(), "Per-article classification budget");
            Ok(SentimentBackend::Llm(retry))
        }
    }
}

async fn run_report(args: &Cli, topic: &str, setting: &TopicSetting) -> Result<ReportBundle, Box<dyn Error>> {
    let timeout = Duration::from_secs(args.timeout_secs);
    let options = RunOptions {
        fetch_timeout: timeout,
        classify: ClassifyOptions {
            concurrency: usize::from(args.concurrency),
            timeout,
        },
    };

    let source = build_source(args, timeout)?;
    let classifier = build_classifier(args).await?;
    info!(source = source.name(), classifier = classifier.name(), "Pipeline ready");

    Ok(analyze_topic(topic, setting, &source, &classifier, &options).await?)
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment_report starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.topic, ?args.source, ?args.classifier, ?args.language, "Parsed CLI arguments");

    // ---- Topic table ----
    let table = match &args.topics_file {
        Some(path) => Cow::Owned(TopicTable::from_yaml_file(path)?),
        None => Cow::Borrowed(TopicTable::builtin()),
    };
    debug!(topics = table.len(), "Topic table ready");

    if args.list_topics {
        for name in table.names() {
            let setting = table.get(name)?.1;
            println!("{name}\t{}", setting.search_term);
        }
        return Ok(());
    }

    let requested = args.topic.as_deref().ok_or("--topic is required")?;
    let (topic, setting) = match table.get(requested) {
        Ok(found) => found,
        Err(e) => {
            error!(topic = requested, error = %e, "Unknown topic");
            return Err(e.into());
        }
    };
    info!(topic, search_term = %setting.search_term, keywords = setting.keywords.len(), "Resolved topic");

    // Early check: ensure output dirs are writable
    for dir in [&args.json_output_dir, &args.markdown_output_dir] {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "Output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Run the pipeline ----
    match run_report(&args, topic, setting).await {
        Ok(bundle) => {
            if let Err(e) = json::write_bundle(&bundle, &args.json_output_dir).await {
                error!(error = %e, "Failed to write JSON bundle");
                return Err(e);
            }

            let md = markdown::render_report(&bundle, args.language, args.max_visible);
            if let Err(e) =
                markdown::write_markdown(&md, &args.markdown_output_dir, topic, bundle.generated_at).await
            {
                error!(error = %e, "Failed writing Markdown");
                return Err(e);
            }
        }
        Err(e) => {
            error!(topic, error = %e, "Analysis run failed; writing failure page");
            if let Err(write_err) = outputs::publish_failure(
                &args.json_output_dir,
                &args.markdown_output_dir,
                topic,
                args.language,
                &e.to_string(),
                Utc::now(),
            )
            .await
            {
                error!(error = %write_err, "Failed writing failure page");
            }
            return Err(e);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
