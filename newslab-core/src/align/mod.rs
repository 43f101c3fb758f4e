//! Aligner: per-day sentiment aggregation and the date join with returns.

pub mod daily;
pub mod join;

pub use daily::{aggregate_daily, dominant_label};
pub use join::{align, align_articles, align_with_lag, ArticleObservation, JoinKey, NEWS_SUFFIX, STOCK_SUFFIX};
