//! Strict inner join of sentiment onto trading days.
//!
//! Dates are matched exactly at day granularity. A news date with no trading
//! row (weekend, holiday, gap) is dropped; there is no nearest-date fallback.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    nan, AlignedObservation, DailySentimentSummary, ScoredNews, SentimentLabel, StockSeries,
};

/// Suffix for the news side of a column present on both sides.
pub const NEWS_SUFFIX: &str = "_news";
/// Suffix for the stock side of a column present on both sides.
pub const STOCK_SUFFIX: &str = "_stock";

/// Columns the join matches on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKey {
    /// Date and ticker must both match.
    #[default]
    DateAndSymbol,
    /// Date only; any symbol's news pairs with the series.
    Date,
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::DateAndSymbol => "date_and_symbol",
            Self::Date => "date",
        })
    }
}

impl FromStr for JoinKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date_and_symbol" | "date-and-symbol" => Ok(Self::DateAndSymbol),
            "date" => Ok(Self::Date),
            other => Err(format!("unknown join key '{other}' (expected date_and_symbol or date)")),
        }
    }
}

impl JoinKey {
    fn accepts(&self, news_symbol: &str, series_symbol: &str) -> bool {
        match self {
            Self::DateAndSymbol => news_symbol == series_symbol,
            Self::Date => true,
        }
    }
}

/// Row index of each trading date.
fn date_index(series: &StockSeries) -> HashMap<NaiveDate, usize> {
    series
        .rows()
        .iter()
        .enumerate()
        .map(|(i, r)| (r.date, i))
        .collect()
}

/// Same-day join of daily summaries with the series' returns.
pub fn align(
    summaries: &[DailySentimentSummary],
    series: &StockSeries,
    key: JoinKey,
) -> Vec<AlignedObservation> {
    align_with_lag(summaries, series, key, 0)
}

/// Pair each summary with the return `lag` trading rows after its date.
///
/// The news date must itself be a trading date. Pairs whose lagged row runs
/// off the end of the series are dropped.
pub fn align_with_lag(
    summaries: &[DailySentimentSummary],
    series: &StockSeries,
    key: JoinKey,
    lag: usize,
) -> Vec<AlignedObservation> {
    let index = date_index(series);
    let rows = series.rows();

    let aligned: Vec<AlignedObservation> = summaries
        .iter()
        .filter(|s| key.accepts(&s.stock_symbol, series.symbol()))
        .filter_map(|s| {
            let i = index.get(&s.date)? + lag;
            let row = rows.get(i)?;
            Some(AlignedObservation {
                date: s.date,
                stock_symbol: s.stock_symbol.clone(),
                series_symbol: series.symbol().to_string(),
                avg_sentiment: s.avg_sentiment,
                std_sentiment: s.std_sentiment,
                article_count: s.article_count,
                dominant_sentiment: s.dominant_sentiment,
                return_date: row.date,
                close: row.close,
                daily_return: row.daily_return,
                daily_return_pct: row.daily_return_pct,
            })
        })
        .collect();

    debug!(
        symbol = %series.symbol(),
        summaries = summaries.len(),
        aligned = aligned.len(),
        lag,
        "aligned sentiment with returns"
    );
    aligned
}

/// One article joined with its day's return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleObservation {
    pub date: NaiveDate,
    pub headline: String,
    pub stock_symbol: String,
    pub series_symbol: String,
    pub polarity: f64,
    pub subjectivity: f64,
    pub label: SentimentLabel,
    pub close: Option<f64>,
    #[serde(with = "nan")]
    pub daily_return: f64,
    #[serde(with = "nan")]
    pub daily_return_pct: f64,
}

/// Article-level inner join, one output row per matched article in input
/// order.
pub fn align_articles(
    scored: &[ScoredNews],
    series: &StockSeries,
    key: JoinKey,
) -> Vec<ArticleObservation> {
    let index = date_index(series);
    let rows = series.rows();
    scored
        .iter()
        .filter(|s| key.accepts(&s.news.stock_symbol, series.symbol()))
        .filter_map(|s| {
            let row = &rows[*index.get(&s.news.date)?];
            Some(ArticleObservation {
                date: s.news.date,
                headline: s.news.headline.clone(),
                stock_symbol: s.news.stock_symbol.clone(),
                series_symbol: series.symbol().to_string(),
                polarity: s.sentiment.polarity,
                subjectivity: s.sentiment.subjectivity,
                label: s.sentiment.label,
                close: row.close,
                daily_return: row.daily_return,
                daily_return_pct: row.daily_return_pct,
            })
        })
        .collect()
}
