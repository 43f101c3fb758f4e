//! Serializable analysis configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file is a valid
//! config that analyses nothing until `data.symbols` is filled in.
//!
//! ```toml
//! [data]
//! news_path = "data/news.csv"
//! symbols = ["AAPL", "MSFT"]
//! stock_dir = "data/stocks"
//! source = "csv"
//! start = "2024-01-01"
//! end = "2024-06-30"
//!
//! [indicators]
//! backend = "full"
//!
//! [alignment]
//! join = "date_and_symbol"
//! lag = 1
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use newslab_core::align::JoinKey;
use newslab_core::indicators::BackendKind;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Largest accepted return lag, in trading days.
pub const MAX_LAG: usize = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub data: DataConfig,
    pub indicators: IndicatorConfig,
    pub sentiment: SentimentConfig,
    pub alignment: AlignmentConfig,
    pub output: OutputConfig,
}

/// Where a symbol's price history comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockSource {
    /// `{stock_dir}/{SYMBOL}.csv`
    #[default]
    Csv,
    /// The market-data provider handed to the pipeline.
    Provider,
    /// Deterministic random walk; for offline demos only.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// News dump, `.csv` or `.json`.
    pub news_path: Option<PathBuf>,
    pub symbols: Vec<String>,
    pub stock_dir: PathBuf,
    pub source: StockSource,
    /// Inclusive date window; `None` leaves that side open.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Generate synthetic prices when a symbol cannot be loaded.
    pub synthetic_fallback: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            news_path: None,
            symbols: Vec::new(),
            stock_dir: PathBuf::from("data/stocks"),
            source: StockSource::Csv,
            start: None,
            end: None,
            synthetic_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Extra `word,polarity,subjectivity` keyword boosts layered over the
    /// built-in financial keywords.
    pub lexicon_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub join: JoinKey,
    /// Trading days between the news date and the paired return.
    pub lag: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub csv: bool,
    pub report: bool,
    pub chart: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            csv: true,
            report: true,
            chart: true,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data.symbols.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid("data.symbols is empty".into()));
        }
        if let (Some(start), Some(end)) = (self.data.start, self.data.end) {
            if end < start {
                return Err(ConfigError::Invalid(format!(
                    "data.end ({end}) is before data.start ({start})"
                )));
            }
        }
        if self.alignment.lag > MAX_LAG {
            return Err(ConfigError::Invalid(format!(
                "alignment.lag {} exceeds the maximum of {MAX_LAG} trading days",
                self.alignment.lag
            )));
        }
        Ok(())
    }

    /// Canonical symbol list: trimmed, upper-cased, blanks and repeats removed,
    /// first occurrence order kept.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in &self.data.symbols {
            let sym = newslab_core::domain::normalize_symbol(s);
            if !sym.is_empty() && !out.contains(&sym) {
                out.push(sym);
            }
        }
        out
    }

    /// Deterministic hash of this configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisConfig {
        AnalysisConfig::from_toml_str(
            r#"
            [data]
            news_path = "news.csv"
            symbols = ["aapl", " MSFT ", "AAPL", ""]
            start = "2024-01-01"
            end = "2024-06-30"

            [indicators]
            backend = "basic"

            [alignment]
            join = "date"
            lag = 1
            "#,
        )
        .unwrap()
    }

    #[test]
    fn parses_all_tables() {
        let config = sample();
        assert_eq!(config.data.news_path, Some(PathBuf::from("news.csv")));
        assert_eq!(config.data.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.indicators.backend, BackendKind::Basic);
        assert_eq!(config.alignment.join, JoinKey::Date);
        assert_eq!(config.alignment.lag, 1);
        assert_eq!(config.data.source, StockSource::Csv);
        assert!(config.output.csv);
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.indicators.backend, BackendKind::Full);
        assert_eq!(config.output.dir, PathBuf::from("results"));
    }

    #[test]
    fn symbols_are_normalized_and_deduped() {
        assert_eq!(sample().symbols(), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn validate_rejects_bad_configs() {
        let mut config = sample();
        config.data.symbols = vec![" ".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = sample();
        config.data.end = NaiveDate::from_ymd_opt(2023, 1, 1);
        assert!(config.validate().unwrap_err().to_string().contains("before"));

        let mut config = sample();
        config.alignment.lag = MAX_LAG + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        let err = AnalysisConfig::from_toml_str("[indicators]\nbackend = \"talib\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = sample();
        assert_eq!(a.run_id(), a.run_id());
        assert_eq!(a.run_id().len(), 64);

        let mut b = a.clone();
        b.alignment.lag = 2;
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/newslab.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/newslab.toml"));
    }
}
