//! Preprocessor: turns raw news and price rows into validated records.
//!
//! Malformed rows are dropped one at a time and counted; nothing here fails
//! the batch.

pub mod news;
pub mod stock;

pub use news::{clean_news, clean_news_with_report, NewsCleaningReport};
pub use stock::{clean_stock, clean_stock_with_report, StockCleaningReport};
