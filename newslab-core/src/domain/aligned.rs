//! Per-day sentiment summaries and their join with stock returns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::nan;
use super::sentiment::SentimentLabel;

/// Sentiment of one symbol's articles on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentimentSummary {
    pub date: NaiveDate,
    pub stock_symbol: String,
    pub avg_sentiment: f64,
    /// Sample standard deviation of polarity; NaN for a single article.
    #[serde(with = "nan")]
    pub std_sentiment: f64,
    pub article_count: usize,
    pub dominant_sentiment: SentimentLabel,
}

/// A sentiment observation matched to a stock return.
///
/// `stock_symbol` is the news side's symbol and `series_symbol` the price
/// series it was joined against; they differ only under a date-only join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedObservation {
    pub date: NaiveDate,
    pub stock_symbol: String,
    pub series_symbol: String,
    pub avg_sentiment: f64,
    #[serde(with = "nan")]
    pub std_sentiment: f64,
    pub article_count: usize,
    pub dominant_sentiment: SentimentLabel,
    /// Trading date the return belongs to; equals `date` unless lagged.
    pub return_date: NaiveDate,
    pub close: Option<f64>,
    #[serde(with = "nan")]
    pub daily_return: f64,
    #[serde(with = "nan")]
    pub daily_return_pct: f64,
}

impl AlignedObservation {
    /// Both sides of the pair are usable for a correlation.
    pub fn is_complete(&self) -> bool {
        self.avg_sentiment.is_finite() && self.daily_return.is_finite()
    }
}
