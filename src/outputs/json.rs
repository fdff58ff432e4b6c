//! JSON output of report bundles.
//!
//! Bundles are grouped by the UTC date of the run:
//! ```text
//! json_output_dir/
//! └── 2026-10-17/
//!     ├── us-tariffs.json
//!     └── inflation.json
//! ```
//!
//! A later run for the same topic on the same day replaces the earlier file.
//! A failed run removes it (see [`remove_bundle`]) so the directory never
//! holds a bundle older than the latest run.

use crate::models::ReportBundle;
use crate::utils::slugify_title;
use chrono::NaiveDate;
use std::error::Error;
use std::io::ErrorKind;
use tokio::fs;
use tracing::{error, info, instrument, warn};

fn dated_dir(json_output_dir: &str, date: NaiveDate) -> String {
    format!("{}/{}", json_output_dir.trim_end_matches('/'), date)
}

/// Path of the bundle for `topic` on `date`.
pub fn bundle_path(json_output_dir: &str, topic: &str, date: NaiveDate) -> String {
    format!("{}/{}.json", dated_dir(json_output_dir, date), slugify_title(topic))
}

/// Write a [`ReportBundle`] to `{json_output_dir}/{date}/{topic-slug}.json`.
///
/// # Arguments
///
/// * `bundle` - The finished report
/// * `json_output_dir` - Root JSON output directory; the dated subdirectory is created
///
/// # Returns
///
/// The path written.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, topic = %bundle.topic))]
pub async fn write_bundle(bundle: &ReportBundle, json_output_dir: &str) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(bundle)?;

    let date = bundle.generated_at.date_naive();
    let full_json_dir = dated_dir(json_output_dir, date);
    info!(%full_json_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(%full_json_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = bundle_path(json_output_dir, &bundle.topic, date);
    fs::write(&output_json_filename, json).await?;
    info!(path = %output_json_filename, "Wrote report bundle JSON");

    Ok(output_json_filename)
}

/// Delete the bundle for `topic` on `date`, if one was written earlier.
///
/// # Arguments
///
/// * `json_output_dir` - Root JSON output directory
/// * `topic` - Topic name; slugified into the file name
/// * `date` - UTC date of the failed run
///
/// # Returns
///
/// `true` if a stale bundle was removed, `false` if there was none.
#[instrument(level = "info", skip(json_output_dir))]
pub async fn remove_bundle(json_output_dir: &str, topic: &str, date: NaiveDate) -> Result<bool, Box<dyn Error>> {
    let path = bundle_path(json_output_dir, topic, date);
    match fs::remove_file(&path).await {
        Ok(()) => {
            warn!(%path, "Removed stale report bundle");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => {
            error!(%path, error = %e, "Failed to remove stale report bundle");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentimentCounts, ScoredArticle, Sentiment};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_write_bundle_round_trips() {
        let bundle = ReportBundle {
            topic: "Oil Prices".to_string(),
            search_term: "oil prices".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
            counts: SentimentCounts {
                positive: 1,
                neutral: 0,
                negative: 0,
            },
            positive: vec![ScoredArticle {
                source: "Reuters".to_string(),
                title: "Oil rebounds".to_string(),
                description: String::new(),
                sentiment: Sentiment::Positive,
                score: None,
            }],
            negative: vec![],
            narrative: "n".to_string(),
            filtered_out: 0,
            dropped: 0,
        };

        let dir = std::env::temp_dir().join(format!("nsr-json-{}", std::process::id()));
        let path = write_bundle(&bundle, dir.to_str().unwrap()).await.unwrap();
        assert!(path.ends_with("2026-10-17/oil-prices.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"sentiment\": \"POSITIVE\""));
        let back: ReportBundle = serde_json::from_str(&written).unwrap();
        assert_eq!(back, bundle);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_remove_bundle() {
        let dir = std::env::temp_dir().join(format!("nsr-json-rm-{}", std::process::id()));
        let dir_str = dir.to_str().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let path = bundle_path(dir_str, "US Tariffs", date);
        assert!(path.ends_with("2026-10-17/us-tariffs.json"));

        assert!(!remove_bundle(dir_str, "US Tariffs", date).await.unwrap());
        std::fs::create_dir_all(dir.join("2026-10-17")).unwrap();
        std::fs::write(&path, "{}").unwrap();
        assert!(remove_bundle(dir_str, "US Tariffs", date).await.unwrap());
        assert!(!std::path::Path::new(&path).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
