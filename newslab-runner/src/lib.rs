//! NewsLab Runner — analysis orchestration, data loading, export.
//!
//! This crate builds on `newslab-core` to provide:
//! - TOML analysis configuration with validation and a deterministic run ID
//! - News and price loaders (CSV/JSON), lexicon loading, synthetic prices
//! - Market-data provider trait with a Yahoo Finance implementation
//! - The end-to-end pipeline: clean, score, compute, align, correlate
//! - JSON/CSV/Markdown export and chart data

pub mod chart;
pub mod config;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod provider;
pub mod yahoo;

pub use chart::CorrelationChart;
pub use config::{AnalysisConfig, ConfigError, OutputConfig, StockSource};
pub use export::{
    export_aligned_csv, export_daily_csv, export_indicators_csv, export_json,
    export_markdown, export_scored_news_csv, import_json, save_artifacts,
};
pub use loader::{load_news, load_stock_csv, synthetic_stock, LoadError};
pub use pipeline::{
    analyze, run_analysis, AnalysisInputs, AnalysisResult, RunError, SymbolAnalysis,
    SCHEMA_VERSION,
};
pub use provider::{
    download_symbols, DataError, DataProvider, DataSource, DownloadProgress, DownloadSummary,
    StdoutProgress,
};
pub use yahoo::YahooProvider;
