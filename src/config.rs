//! Topic configuration.
//!
//! A topic pairs the search term sent to the news source with the keyword
//! set used to keep only relevant results. The table is read once at start
//! (either the built-in one or a YAML file) and never changes afterwards.
//!
//! # YAML format
//!
//! ```yaml
//! US Tariffs:
//!   search_term: tariffs trade policy
//!   keywords: [tariff, trade war, import duty]
//! ```

use crate::error::ConfigError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, instrument};

/// Search term and relevance keywords for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopicSetting {
    pub search_term: String,
    /// Lower-cased keywords; an article must mention at least one.
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl TopicSetting {
    pub fn new<I, S>(search_term: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            search_term: search_term.to_string(),
            keywords: normalize_keywords(keywords),
        }
    }
}

fn normalize_keywords<I, S>(keywords: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

static BUILTIN_TOPICS: Lazy<TopicTable> = Lazy::new(|| {
    let mut topics = BTreeMap::new();
    topics.insert(
        "US Tariffs".to_string(),
        TopicSetting::new(
            "US tariffs trade policy",
            ["tariff", "trade war", "import duty", "customs", "trade deal", "protectionism"],
        ),
    );
    topics.insert(
        "Inflation".to_string(),
        TopicSetting::new(
            "inflation consumer prices",
            ["inflation", "cpi", "consumer price", "cost of living", "price index", "deflation"],
        ),
    );
    topics.insert(
        "Interest Rates".to_string(),
        TopicSetting::new(
            "Federal Reserve interest rates",
            ["interest rate", "federal reserve", "fed", "rate cut", "rate hike", "monetary policy"],
        ),
    );
    topics.insert(
        "Labor Market".to_string(),
        TopicSetting::new(
            "US jobs report labor market",
            ["jobs", "unemployment", "payroll", "labor market", "hiring", "layoffs", "wages"],
        ),
    );
    topics.insert(
        "Housing Market".to_string(),
        TopicSetting::new(
            "US housing market mortgage rates",
            ["housing", "mortgage", "home sales", "home prices", "real estate", "rent"],
        ),
    );
    topics.insert(
        "Oil Prices".to_string(),
        TopicSetting::new(
            "oil prices OPEC crude",
            ["oil", "crude", "opec", "brent", "gasoline", "energy prices"],
        ),
    );
    TopicTable { topics }
});

/// Immutable mapping from topic name to [`TopicSetting`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TopicTable {
    topics: BTreeMap<String, TopicSetting>,
}

impl TopicTable {
    /// The topic table compiled into the binary.
    pub fn builtin() -> &'static TopicTable {
        &BUILTIN_TOPICS
    }

    /// Parse a YAML topic table, normalizing keywords.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut table: TopicTable = serde_yaml::from_str(yaml)?;
        if table.topics.is_empty() {
            return Err(ConfigError::Invalid("topic table is empty".to_string()));
        }
        for (name, setting) in table.topics.iter_mut() {
            if setting.search_term.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("topic {name:?} has an empty search_term")));
            }
            setting.keywords = normalize_keywords(std::mem::take(&mut setting.keywords));
        }
        Ok(table)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml_str(&yaml)?;
        info!(topics = table.topics.len(), "Loaded topic table");
        Ok(table)
    }

    /// Look up a topic; exact name first, then case-insensitive.
    ///
    /// Returns the canonical topic name along with its setting.
    pub fn get(&self, name: &str) -> Result<(&str, &TopicSetting), ConfigError> {
        if let Some((k, v)) = self.topics.get_key_value(name) {
            return Ok((k.as_str(), v));
        }
        self.topics
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name.trim()))
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownTopic {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }
}
