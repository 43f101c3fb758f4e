//! Analysis pipeline: wires loaders, the core stages, and correlation.
//!
//! Two entry points:
//! - `run_analysis()`: loads news and prices per the config, then analyses.
//!   Used by the CLI.
//! - `analyze()`: pure, takes pre-loaded inputs. Used by tests and callers
//!   that bring their own data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use newslab_core::align::{aggregate_daily, align_with_lag, JoinKey};
use newslab_core::domain::{
    AlignedObservation, DailySentimentSummary, NewsRecord, RawNewsRow, RawStockTable, ScoredNews,
    StockSeries,
};
use newslab_core::indicators::{IndicatorEngine, IndicatorRow};
use newslab_core::preprocess::{
    clean_news_with_report, clean_stock_with_report, NewsCleaningReport, StockCleaningReport,
};
use newslab_core::sentiment::{
    label_distribution, LabelCounts, SentimentError, SentimentScorer, VaderModel,
};
use newslab_core::stats::{correlate, CorrelationResult};

use crate::config::{AnalysisConfig, ConfigError, StockSource};
use crate::loader::{
    load_lexicon_csv, load_stock_csv, stock_csv_path, synthetic_stock, try_load_news, LoadError,
};
use crate::provider::{fetch_stock, DataProvider, DataSource};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no news source configured (set data.news_path)")]
    NoNewsSource,
    #[error("news could not be loaded: {0}")]
    News(#[source] LoadError),
    #[error("custom lexicon could not be loaded: {0}")]
    Lexicon(#[source] LoadError),
    #[error("sentiment model error: {0}")]
    Sentiment(#[from] SentimentError),
    #[error("no price data for any symbol ({0})")]
    NoPriceData(String),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything the pipeline consumes, already read from disk or network.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInputs {
    pub news: Vec<RawNewsRow>,
    pub stocks: Vec<(RawStockTable, DataSource)>,
}

/// Per-symbol outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub source: DataSource,
    pub stock_report: StockCleaningReport,
    /// False when a required price column was absent.
    pub has_indicators: bool,
    pub indicator_backend: String,
    pub indicators: Vec<IndicatorRow>,
    pub aligned: Vec<AlignedObservation>,
    pub correlation: CorrelationResult,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    pub sentiment_model: String,
    pub join: JoinKey,
    pub lag: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub news_report: NewsCleaningReport,
    /// Cleaned articles outside the date window.
    pub news_out_of_window: usize,
    pub label_distribution: LabelCounts,
    pub scored_news: Vec<ScoredNews>,
    pub daily_sentiment: Vec<DailySentimentSummary>,
    pub symbols: Vec<SymbolAnalysis>,
    /// All symbols' aligned rows correlated together.
    pub pooled: CorrelationResult,
    pub data_quality_warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolAnalysis> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }

    pub fn aligned(&self) -> impl Iterator<Item = &AlignedObservation> {
        self.symbols.iter().flat_map(|s| s.aligned.iter())
    }
}

/// Build the scorer, layering custom keyword entries over the built-in
/// financial keywords.
pub fn build_scorer(config: &AnalysisConfig) -> Result<SentimentScorer, RunError> {
    match &config.sentiment.lexicon_path {
        None => Ok(SentimentScorer::default()),
        Some(path) => {
            let entries = load_lexicon_csv(path).map_err(RunError::Lexicon)?;
            info!(path = %path.display(), entries = entries.len(), "loaded custom lexicon");
            Ok(SentimentScorer::new(Box::new(VaderModel::with_entries(entries)?)))
        }
    }
}

/// Load inputs per the config and run the analysis.
pub fn run_analysis(
    config: &AnalysisConfig,
    provider: Option<&dyn DataProvider>,
) -> Result<AnalysisResult, RunError> {
    config.validate()?;
    let news_path = config.data.news_path.as_ref().ok_or(RunError::NoNewsSource)?;
    let news = try_load_news(news_path).map_err(RunError::News)?;
    let scorer = build_scorer(config)?;

    let window = price_window(config, &news);
    let mut stocks = Vec::new();
    let mut failed = Vec::new();
    for symbol in config.symbols() {
        match load_prices(config, provider, &symbol, window) {
            Some(loaded) => stocks.push(loaded),
            None => failed.push(symbol),
        }
    }
    if stocks.is_empty() {
        return Err(RunError::NoPriceData(failed.join(", ")));
    }

    let mut result = analyze(&AnalysisInputs { news, stocks }, config, &scorer);
    for symbol in failed {
        result
            .data_quality_warnings
            .push(format!("{symbol}: no price data, symbol skipped"));
    }
    Ok(result)
}

/// Date range to request from a provider or synthesise: the configured
/// window, with open sides filled from the news dates.
fn price_window(config: &AnalysisConfig, news: &[RawNewsRow]) -> Option<(NaiveDate, NaiveDate)> {
    let dates: Vec<NaiveDate> = news
        .iter()
        .filter_map(|r| r.timestamp.as_deref())
        .filter_map(|t| newslab_core::domain::parse_date(t).ok())
        .collect();
    let start = config.data.start.or_else(|| dates.iter().min().copied())?;
    let end = config.data.end.or_else(|| dates.iter().max().copied())?;
    // Headroom for indicator warm-up before the window and lagged returns after.
    let lead = chrono::Duration::days(120);
    let tail = chrono::Duration::days(2 * config.alignment.lag as i64 + 7);
    Some((start - lead, end + tail))
}

fn load_prices(
    config: &AnalysisConfig,
    provider: Option<&dyn DataProvider>,
    symbol: &str,
    window: Option<(NaiveDate, NaiveDate)>,
) -> Option<(RawStockTable, DataSource)> {
    let loaded = match config.data.source {
        StockSource::Csv => load_stock_csv(&stock_csv_path(&config.data.stock_dir, symbol), symbol)
            .map(|t| (t, DataSource::CsvFile)),
        StockSource::Provider => match (provider, window) {
            (Some(p), Some((start, end))) => {
                fetch_stock(p, symbol, start, end).map(|t| (t, DataSource::YahooFinance))
            }
            (None, _) => {
                warn!(symbol, "no market-data provider available");
                None
            }
            (_, None) => {
                warn!(symbol, "no date window for provider fetch");
                None
            }
        },
        StockSource::Synthetic => {
            window.map(|(start, end)| (synthetic_stock(symbol, start, end), DataSource::Synthetic))
        }
    };

    match (loaded, window) {
        (Some(loaded), _) => Some(loaded),
        (None, Some((start, end))) if config.data.synthetic_fallback => {
            warn!(symbol, "using synthetic prices; results are tagged as synthetic");
            Some((synthetic_stock(symbol, start, end), DataSource::Synthetic))
        }
        (None, _) => None,
    }
}

fn in_window(date: NaiveDate, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

/// Run every stage over pre-loaded inputs. Never fails: bad rows are
/// dropped and undefined statistics come back as NaN.
pub fn analyze(
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    scorer: &SentimentScorer,
) -> AnalysisResult {
    let mut warnings = Vec::new();
    let (start, end) = (config.data.start, config.data.end);

    // ── News → sentiment → daily summaries ──
    let (cleaned, news_report) = clean_news_with_report(&inputs.news);
    if news_report.dropped() > 0 {
        warnings.push(format!(
            "news: dropped {} of {} rows ({} duplicates, {} empty headlines, {} bad timestamps)",
            news_report.dropped(),
            news_report.input_rows,
            news_report.duplicates,
            news_report.empty_headlines,
            news_report.bad_timestamps
        ));
    }
    let (news, outside): (Vec<NewsRecord>, Vec<NewsRecord>) =
        cleaned.into_iter().partition(|r| in_window(r.date, start, end));
    let scored = scorer.score_news(&news);
    let daily = aggregate_daily(&scored);

    // ── Prices → indicators → alignment → correlation, per symbol ──
    let engine = IndicatorEngine::new(config.indicators.backend);
    let mut series_list: Vec<StockSeries> = Vec::new();
    let mut symbols = Vec::new();
    for (table, source) in &inputs.stocks {
        let (series, stock_report) = clean_stock_with_report(table);
        let symbol = series.symbol().to_string();
        if stock_report.dropped() > 0 {
            warnings.push(format!(
                "{symbol}: dropped {} of {} price rows",
                stock_report.dropped(),
                stock_report.input_rows
            ));
        }
        if stock_report.inconsistent_ohlc > 0 {
            warnings.push(format!(
                "{symbol}: {} price rows with high/low not bounding open/close",
                stock_report.inconsistent_ohlc
            ));
        }
        if *source == DataSource::Synthetic {
            warnings.push(format!("{symbol}: synthetic prices"));
        }

        let table = engine.compute_indicators(&series);
        if !table.has_indicators() {
            warnings.push(format!(
                "{symbol}: missing price columns ({}), indicators skipped",
                series.columns().missing().join(", ")
            ));
        }

        let aligned = align_with_lag(&daily, &series, config.alignment.join, config.alignment.lag);
        let correlation = correlate(&aligned);
        if !correlation.is_defined() {
            warnings.push(format!(
                "{symbol}: correlation undefined ({} complete pairs)",
                correlation.n_observations
            ));
        }
        info!(
            symbol = %symbol,
            aligned = aligned.len(),
            pearson = correlation.pearson_corr,
            n = correlation.n_observations,
            "symbol analysed"
        );

        symbols.push(SymbolAnalysis {
            symbol,
            source: *source,
            stock_report,
            has_indicators: table.has_indicators(),
            indicator_backend: table.backend().to_string(),
            indicators: table.rows(),
            aligned,
            correlation,
        });
        series_list.push(series);
    }

    let pooled_rows: Vec<AlignedObservation> =
        symbols.iter().flat_map(|s| s.aligned.iter().cloned()).collect();
    let pooled = correlate(&pooled_rows);

    AnalysisResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        dataset_hash: dataset_hash(&news, &series_list),
        has_synthetic: symbols.iter().any(|s| s.source == DataSource::Synthetic),
        sentiment_model: scorer.model_name().to_string(),
        join: config.alignment.join,
        lag: config.alignment.lag,
        start,
        end,
        news_report,
        news_out_of_window: outside.len(),
        label_distribution: label_distribution(&scored),
        scored_news: scored,
        daily_sentiment: daily,
        symbols,
        pooled,
        data_quality_warnings: warnings,
    }
}

/// Deterministic BLAKE3 hash over the cleaned news and price data, in input
/// order.
fn dataset_hash(news: &[NewsRecord], series: &[StockSeries]) -> String {
    let mut hasher = blake3::Hasher::new();

    for record in news {
        hasher.update(record.headline.as_bytes());
        hasher.update(record.timestamp.to_string().as_bytes());
        hasher.update(record.stock_symbol.as_bytes());
    }
    for s in series {
        hasher.update(s.symbol().as_bytes());
        for row in s.rows() {
            hasher.update(row.date.to_string().as_bytes());
            for v in [row.open, row.high, row.low, row.close] {
                hasher.update(&v.unwrap_or(f64::NAN).to_le_bytes());
            }
            hasher.update(&row.volume.unwrap_or(0).to_le_bytes());
        }
    }

    hasher.finalize().to_hex().to_string()
}
