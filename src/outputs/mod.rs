//! Output generation for report bundles.
//!
//! # Submodules
//!
//! - [`json`]: Writes the `ReportBundle` as JSON for downstream consumers
//! - [`markdown`]: Renders the bundle (or a failure page) as a Markdown report
//! - [`locale`]: Label tables for each report language
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-17/
//!     ├── us-tariffs.json
//!     └── inflation.json
//!
//! markdown_output_dir/
//! ├── 2026-10-17_us-tariffs.md
//! └── 2026-10-17_inflation.md
//! ```

pub mod json;
pub mod locale;
pub mod markdown;

use crate::outputs::locale::Language;
use chrono::{DateTime, Utc};
use std::error::Error;
use tracing::{error, instrument};

/// Record a failed run: drop any bundle an earlier run wrote for the same
/// topic and day, then write the failure page in place of the report.
///
/// # Arguments
///
/// * `json_output_dir` - Root JSON output directory
/// * `markdown_output_dir` - Markdown output directory
/// * `topic` - Topic name of the failed run
/// * `language` - Language of the failure page
/// * `reason` - Error message shown on the page
/// * `at` - Time of the failure
///
/// # Returns
///
/// The path of the failure page.
#[instrument(level = "info", skip(json_output_dir, markdown_output_dir, reason))]
pub async fn publish_failure(
    json_output_dir: &str,
    markdown_output_dir: &str,
    topic: &str,
    language: Language,
    reason: &str,
    at: DateTime<Utc>,
) -> Result<String, Box<dyn Error>> {
    if let Err(e) = json::remove_bundle(json_output_dir, topic, at.date_naive()).await {
        error!(error = %e, "Stale bundle left in place");
    }

    let md = markdown::render_failure(topic, language, reason, at);
    markdown::write_markdown(&md, markdown_output_dir, topic, at).await
}
