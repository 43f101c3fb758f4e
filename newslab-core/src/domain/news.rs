//! News article rows: raw (as loaded) and cleaned.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A news row as it comes out of a CSV or JSON dump, before any validation.
///
/// Every field is optional; the cleaner decides what survives. Header aliases
/// cover the common dump layout (`headline,url,publisher,date,stock`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNewsRow {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "date", deserialize_with = "stringish")]
    pub timestamp: Option<String>,
    #[serde(default, alias = "stock", alias = "symbol", alias = "ticker")]
    pub stock_symbol: Option<String>,
}

impl RawNewsRow {
    pub fn new(headline: &str, timestamp: &str, stock_symbol: &str) -> Self {
        Self {
            headline: Some(headline.to_string()),
            publisher: None,
            url: None,
            timestamp: Some(timestamp.to_string()),
            stock_symbol: Some(stock_symbol.to_string()),
        }
    }
}

/// A cleaned news article with its derived fields.
///
/// Invariants: `headline` is trimmed and non-empty, `date` is the date part of
/// `timestamp`, `headline_length` counts characters of `headline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub headline: String,
    pub publisher: Option<String>,
    pub url: Option<String>,
    pub timestamp: NaiveDateTime,
    pub stock_symbol: String,
    pub date: NaiveDate,
    pub headline_length: usize,
    pub publication_hour: u32,
    pub publication_day: String,
}

impl From<&NewsRecord> for RawNewsRow {
    fn from(record: &NewsRecord) -> Self {
        Self {
            headline: Some(record.headline.clone()),
            publisher: record.publisher.clone(),
            url: record.url.clone(),
            timestamp: Some(record.timestamp.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            stock_symbol: Some(record.stock_symbol.clone()),
        }
    }
}

/// Accept a timestamp given either as text or as epoch milliseconds
/// (the default numeric encoding of JSON dumps).
fn stringish<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stamp {
        Text(String),
        Millis(i64),
        Float(f64),
    }

    let stamp = Option::<Stamp>::deserialize(deserializer)?;
    Ok(match stamp {
        None => None,
        Some(Stamp::Text(s)) => Some(s),
        Some(Stamp::Millis(ms)) => millis_to_string(ms),
        Some(Stamp::Float(ms)) if ms.is_finite() => millis_to_string(ms as i64),
        Some(Stamp::Float(_)) => None,
    })
}

fn millis_to_string(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
}
