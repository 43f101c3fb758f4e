//! Market-data provider trait, structured errors, and the download
//! orchestrator.
//!
//! The DataProvider trait abstracts over price sources so the Yahoo client
//! can be swapped or mocked in tests. Providers return raw rows; cleaning
//! happens downstream.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use newslab_core::domain::RawStockTable;

use crate::loader::{stock_csv_path, write_stock_csv};

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub table: RawStockTable,
    pub source: DataSource,
}

/// Where a price series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvFile,
    Synthetic,
}

pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily OHLCV rows for a symbol over an inclusive date range.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;
}

/// Fetch a symbol, turning any provider failure into an absent result.
pub fn fetch_stock(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Option<RawStockTable> {
    match provider.fetch(symbol, start, end) {
        Ok(result) => Some(result.table),
        Err(e) => {
            warn!(provider = provider.name(), symbol, error = %e, "price fetch failed");
            None
        }
    }
}

/// Progress callback for multi-symbol downloads.
pub trait DownloadProgress: Send {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>);

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, index: usize, total: usize, result: &Result<(), DataError>) {
        match result {
            Ok(()) => println!("[{}/{}] {symbol} OK", index + 1, total),
            Err(e) => println!("[{}/{}] {symbol} FAILED: {e}", index + 1, total),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("Done: {succeeded}/{total} succeeded, {failed} failed");
    }
}

/// Summary of a batch download.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Download several symbols into `{out_dir}/{SYMBOL}.csv`.
///
/// Existing files are kept unless `force` is set.
pub fn download_symbols(
    provider: &dyn DataProvider,
    out_dir: &Path,
    symbols: &[&str],
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        if !force && stock_csv_path(out_dir, symbol).exists() {
            progress.on_complete(symbol, i, total, &Ok(()));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, out_dir, symbol, start, end);
        progress.on_complete(symbol, i, total, &result);

        match result {
            Ok(()) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }
    }

    progress.on_batch_complete(succeeded, failed, total);

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

fn download_single(
    provider: &dyn DataProvider,
    out_dir: &Path,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), DataError> {
    let fetched = provider.fetch(symbol, start, end)?;
    std::fs::create_dir_all(out_dir).map_err(|e| DataError::Storage(e.to_string()))?;
    write_stock_csv(&stock_csv_path(out_dir, symbol), &fetched.table)
        .map_err(|e| DataError::Storage(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory provider for tests.

    use super::*;
    use newslab_core::domain::{PriceColumns, RawStockRow};
    use std::collections::HashMap;

    pub struct MockProvider {
        pub tables: HashMap<String, Vec<(NaiveDate, f64)>>,
    }

    impl MockProvider {
        pub fn new(entries: Vec<(&str, Vec<(NaiveDate, f64)>)>) -> Self {
            Self {
                tables: entries
                    .into_iter()
                    .map(|(s, rows)| (s.to_string(), rows))
                    .collect(),
            }
        }
    }

    impl DataProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<FetchResult, DataError> {
            let rows = self.tables.get(symbol).ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;
            let rows = rows
                .iter()
                .filter(|(d, _)| *d >= start && *d <= end)
                .map(|&(d, c)| RawStockRow {
                    date: Some(d.to_string()),
                    open: Some(c),
                    high: Some(c + 1.0),
                    low: Some(c - 1.0),
                    close: Some(c),
                    volume: Some(1_000.0),
                })
                .collect();
            Ok(FetchResult {
                symbol: symbol.to_string(),
                table: RawStockTable::new(symbol, PriceColumns::ALL, rows),
                source: DataSource::YahooFinance,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockProvider;
    use super::*;
    use std::sync::Mutex;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl DownloadProgress for RecordingProgress {
        fn on_start(&self, symbol: &str, _: usize, _: usize) {
            self.events.lock().unwrap().push(format!("start {symbol}"));
        }
        fn on_complete(&self, symbol: &str, _: usize, _: usize, result: &Result<(), DataError>) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {symbol} {}", result.is_ok()));
        }
        fn on_batch_complete(&self, succeeded: usize, failed: usize, _: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("batch {succeeded}/{failed}"));
        }
    }

    #[test]
    fn fetch_stock_absorbs_errors() {
        let provider = MockProvider::new(vec![("AAPL", vec![(day(2), 150.0)])]);
        assert_eq!(fetch_stock(&provider, "AAPL", day(1), day(31)).unwrap().len(), 1);
        assert!(fetch_stock(&provider, "NOPE", day(1), day(31)).is_none());
    }

    #[test]
    fn download_writes_csv_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::new(vec![("AAPL", vec![(day(2), 150.0), (day(3), 151.0)])]);
        let progress = RecordingProgress::default();

        let summary = download_symbols(
            &provider,
            dir.path(),
            &["AAPL", "NOPE"],
            day(1),
            day(31),
            false,
            &progress,
        );

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(summary.errors[0].0, "NOPE");
        assert!(stock_csv_path(dir.path(), "AAPL").exists());
        assert_eq!(
            progress.events.lock().unwrap().last().map(String::as_str),
            Some("batch 1/1")
        );
    }

    #[test]
    fn download_skips_existing_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = stock_csv_path(dir.path(), "AAPL");
        std::fs::write(&path, "date,close\n").unwrap();
        let provider = MockProvider::new(vec![("AAPL", vec![(day(2), 150.0)])]);

        download_symbols(&provider, dir.path(), &["AAPL"], day(1), day(31), false, &StdoutProgress);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "date,close\n");

        download_symbols(&provider, dir.path(), &["AAPL"], day(1), day(31), true, &StdoutProgress);
        assert!(std::fs::read_to_string(&path).unwrap().contains("150"));
    }
}
