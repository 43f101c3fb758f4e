//! File loaders for news dumps, price CSVs and custom lexicons, plus the
//! synthetic price fallback.
//!
//! Each loader has a `try_*` form returning `LoadError` and, where the caller
//! treats failure as "no data", an `Option` form that logs the diagnostic.
//!
//! Synthetic prices are a developer-only demo mode. Results built on them
//! are tagged and should not be read as market evidence.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use newslab_core::domain::{PriceColumns, RawNewsRow, RawStockRow, RawStockTable};
use newslab_core::sentiment::{LexiconEntry, SentimentError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file format '{extension}' for {path} (expected .csv or .json)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("lexicon {path}: {source}")]
    Lexicon {
        path: PathBuf,
        #[source]
        source: SentimentError,
    },
}

/// Supported news dump formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsFormat {
    Csv,
    Json,
}

impl NewsFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);
    // Field names and aliases are lower-case; `DATE`, `Close` and `close`
    // must all deserialize.
    let headers: csv::StringRecord = reader
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    reader.set_headers(headers);
    Ok(reader)
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> LoadError + '_ {
    move |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

// ─── News ───────────────────────────────────────────────────────────

/// Load raw news rows from a `.csv` or `.json` (array of objects) file.
///
/// Rows that fail to deserialize are skipped with a warning; the cleaner
/// handles everything else.
pub fn try_load_news(path: &Path) -> Result<Vec<RawNewsRow>, LoadError> {
    let rows = match NewsFormat::from_path(path)? {
        NewsFormat::Csv => {
            let mut reader = csv_reader(path)?;
            let mut rows = Vec::new();
            let mut skipped = 0usize;
            for record in reader.deserialize::<RawNewsRow>() {
                match record {
                    Ok(row) => rows.push(row),
                    Err(e) if e.is_io_error() => return Err(csv_error(path)(e)),
                    Err(_) => skipped += 1,
                }
            }
            if skipped > 0 {
                warn!(path = %path.display(), skipped, "skipped unreadable news rows");
            }
            rows
        }
        NewsFormat::Json => {
            let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str::<Vec<RawNewsRow>>(&content).map_err(|source| {
                LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                }
            })?
        }
    };
    info!(path = %path.display(), rows = rows.len(), "loaded news");
    Ok(rows)
}

/// [`try_load_news`], with failure reported as `None`.
pub fn load_news(path: &Path) -> Option<Vec<RawNewsRow>> {
    try_load_news(path)
        .map_err(|e| warn!(error = %e, "news not loaded"))
        .ok()
}

// ─── Prices ─────────────────────────────────────────────────────────

/// Conventional location of a symbol's price file.
pub fn stock_csv_path(dir: &Path, symbol: &str) -> PathBuf {
    dir.join(format!("{symbol}.csv"))
}

/// Load one symbol's prices from a CSV with a `Date` column and any subset
/// of `Open, High, Low, Close, Volume` (case-insensitive). Extra columns are
/// ignored; column presence is taken from the header.
pub fn try_load_stock_csv(path: &Path, symbol: &str) -> Result<RawStockTable, LoadError> {
    let mut reader = csv_reader(path)?;
    let headers = reader.headers().map_err(csv_error(path))?.clone();
    if !headers
        .iter()
        .any(|h| matches!(h.to_ascii_lowercase().as_str(), "date" | "datetime"))
    {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "date",
        });
    }
    let columns = PriceColumns::from_headers(headers.iter());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<RawStockRow>() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(csv_error(path)(e)),
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(path = %path.display(), symbol, skipped, "skipped unreadable price rows");
    }
    if !columns.has_all() {
        warn!(path = %path.display(), symbol, missing = ?columns.missing(), "price file lacks columns");
    }
    Ok(RawStockTable::new(symbol, columns, rows))
}

/// [`try_load_stock_csv`], with failure reported as `None`.
pub fn load_stock_csv(path: &Path, symbol: &str) -> Option<RawStockTable> {
    try_load_stock_csv(path, symbol)
        .map_err(|e| warn!(symbol, error = %e, "prices not loaded"))
        .ok()
}

/// Write a raw price table as `date,open,high,low,close,volume`.
pub fn write_stock_csv(path: &Path, table: &RawStockTable) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_error(path))?;
    for row in &table.rows {
        writer.serialize(row).map_err(csv_error(path))?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ─── Lexicon ────────────────────────────────────────────────────────

/// Load `word,polarity,subjectivity` rows. Any invalid entry fails the load.
pub fn load_lexicon_csv(path: &Path) -> Result<Vec<LexiconEntry>, LoadError> {
    let mut reader = csv_reader(path)?;
    let mut entries = Vec::new();
    for record in reader.deserialize::<LexiconEntry>() {
        let entry = record.map_err(csv_error(path))?;
        entry.validate().map_err(|source| LoadError::Lexicon {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

// ─── Synthetic ──────────────────────────────────────────────────────

/// Deterministic weekday random walk from 100.0, seeded by the symbol.
pub fn synthetic_stock(symbol: &str, start: NaiveDate, end: NaiveDate) -> RawStockTable {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut rows = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        if matches!(current.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        rows.push(RawStockRow {
            date: Some(current.to_string()),
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume as f64),
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    RawStockTable::new(symbol, PriceColumns::ALL, rows)
}
