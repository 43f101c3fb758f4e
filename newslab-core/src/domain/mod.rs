//! Domain types for NewsLab

pub mod aligned;
pub mod bar;
pub mod nan;
pub mod news;
pub mod sentiment;
pub mod timestamp;

pub use aligned::{AlignedObservation, DailySentimentSummary};
pub use bar::{
    MissingColumns, PriceColumns, RawStockRow, RawStockTable, StockBar, StockRow, StockSeries,
};
pub use news::{NewsRecord, RawNewsRow};
pub use sentiment::{ScoredNews, SentimentLabel, SentimentScore};
pub use timestamp::{parse_date, parse_timestamp, weekday_name, TimestampError};

/// Symbol type alias
pub type Symbol = String;

/// Canonical ticker form: trimmed, upper-case.
pub fn normalize_symbol(raw: &str) -> Symbol {
    raw.trim().to_ascii_uppercase()
}
