//! Daily price rows: raw table, cleaned series, and the strict OHLCV bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::nan;

/// Which OHLCV columns a source table carried.
///
/// An absent column is a table-level fact, distinct from a missing value in a
/// single row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceColumns {
    pub open: bool,
    pub high: bool,
    pub low: bool,
    pub close: bool,
    pub volume: bool,
}

impl PriceColumns {
    pub const ALL: Self = Self {
        open: true,
        high: true,
        low: true,
        close: true,
        volume: true,
    };

    /// Detect columns from header names (case-insensitive).
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cols = Self::default();
        for h in headers {
            match h.trim().to_ascii_lowercase().as_str() {
                "open" => cols.open = true,
                "high" => cols.high = true,
                "low" => cols.low = true,
                "close" => cols.close = true,
                "volume" => cols.volume = true,
                _ => {}
            }
        }
        cols
    }

    /// Names of the OHLCV columns that are absent, in canonical order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.open, "open"),
            (self.high, "high"),
            (self.low, "low"),
            (self.close, "close"),
            (self.volume, "volume"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }

    pub fn has_all(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required price columns: {}", .0.join(", "))]
pub struct MissingColumns(pub Vec<&'static str>);

/// A price row as loaded, before parsing and validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStockRow {
    #[serde(default, alias = "Date", alias = "Datetime", alias = "datetime")]
    pub date: Option<String>,
    #[serde(default, alias = "Open")]
    pub open: Option<f64>,
    #[serde(default, alias = "High")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low")]
    pub low: Option<f64>,
    #[serde(default, alias = "Close")]
    pub close: Option<f64>,
    #[serde(default, alias = "Volume")]
    pub volume: Option<f64>,
}

/// A raw price table for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStockTable {
    pub symbol: String,
    pub columns: PriceColumns,
    pub rows: Vec<RawStockRow>,
}

impl RawStockTable {
    pub fn new(symbol: impl Into<String>, columns: PriceColumns, rows: Vec<RawStockRow>) -> Self {
        Self {
            symbol: symbol.into(),
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One cleaned trading day. Price fields are `None` only when the source
/// table did not carry that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    /// Percent change of close from the previous row; NaN for the first row.
    #[serde(with = "nan")]
    pub daily_return: f64,
    #[serde(with = "nan")]
    pub daily_return_pct: f64,
}

impl StockRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            daily_return: f64::NAN,
            daily_return_pct: f64::NAN,
        }
    }

    fn satisfies(&self, columns: &PriceColumns) -> bool {
        (!columns.open || self.open.is_some())
            && (!columns.high || self.high.is_some())
            && (!columns.low || self.low.is_some())
            && (!columns.close || self.close.is_some())
            && (!columns.volume || self.volume.is_some())
    }
}

/// A cleaned, date-ordered price series for one symbol.
///
/// Construction enforces: ascending dates, one row per date (first kept),
/// every flagged column populated, and `daily_return` derived from the
/// final row order. Deserialization goes through the same constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StockSeriesFields")]
pub struct StockSeries {
    symbol: String,
    columns: PriceColumns,
    rows: Vec<StockRow>,
}

#[derive(Deserialize)]
struct StockSeriesFields {
    symbol: String,
    columns: PriceColumns,
    rows: Vec<StockRow>,
}

impl From<StockSeriesFields> for StockSeries {
    fn from(fields: StockSeriesFields) -> Self {
        Self::new(fields.symbol, fields.columns, fields.rows)
    }
}

impl StockSeries {
    pub fn new(symbol: impl Into<String>, columns: PriceColumns, rows: Vec<StockRow>) -> Self {
        Self::build(symbol, columns, rows).0
    }

    /// Like [`StockSeries::new`], also returning how many rows were dropped
    /// as duplicate dates.
    pub fn build(
        symbol: impl Into<String>,
        columns: PriceColumns,
        mut rows: Vec<StockRow>,
    ) -> (Self, usize) {
        rows.retain(|r| r.satisfies(&columns));
        // Stable sort keeps first-seen order among equal dates.
        rows.sort_by_key(|r| r.date);
        let before = rows.len();
        rows.dedup_by_key(|r| r.date);
        let duplicates = before - rows.len();

        let mut prev_close: Option<f64> = None;
        for row in rows.iter_mut() {
            row.daily_return = match (prev_close, row.close) {
                (Some(prev), Some(curr)) => curr / prev - 1.0,
                _ => f64::NAN,
            };
            row.daily_return_pct = row.daily_return * 100.0;
            prev_close = row.close;
        }

        (
            Self {
                symbol: symbol.into(),
                columns,
                rows,
            },
            duplicates,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn columns(&self) -> PriceColumns {
        self.columns
    }

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn daily_returns(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.daily_return).collect()
    }

    /// Strict OHLCV bars; fails when the source lacked any required column.
    pub fn bars(&self) -> Result<Vec<StockBar>, MissingColumns> {
        let missing = self.columns.missing();
        if !missing.is_empty() {
            return Err(MissingColumns(missing));
        }
        Ok(self
            .rows
            .iter()
            .filter_map(|r| {
                Some(StockBar {
                    date: r.date,
                    open: r.open?,
                    high: r.high?,
                    low: r.low?,
                    close: r.close?,
                    volume: r.volume?,
                })
            })
            .collect())
    }
}

impl From<&StockSeries> for RawStockTable {
    fn from(series: &StockSeries) -> Self {
        let rows = series
            .rows
            .iter()
            .map(|r| RawStockRow {
                date: Some(r.date.to_string()),
                open: r.open,
                high: r.high,
                low: r.low,
                close: r.close,
                volume: r.volume.map(|v| v as f64),
            })
            .collect();
        RawStockTable::new(series.symbol.clone(), series.columns, rows)
    }
}

/// OHLCV bar for a single symbol on a single day, every field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl StockBar {
    /// Basic OHLC sanity: high is the top of the range, low the bottom.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}
