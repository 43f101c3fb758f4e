//! NewsLab CLI — download, indicator, sentiment, and analysis commands.
//!
//! Commands:
//! - `download` — fetch daily prices from Yahoo Finance into `{SYMBOL}.csv` files
//! - `indicators` — compute the indicator table for one price file
//! - `sentiment` — clean and score a news file
//! - `analyze` — full news/returns analysis from a TOML config or flags
//!
//! Logging goes to stderr and honours `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use newslab_core::align::JoinKey;
use newslab_core::indicators::{BackendKind, IndicatorEngine};
use newslab_core::preprocess::{clean_news_with_report, clean_stock_with_report};
use newslab_core::sentiment::label_distribution;
use newslab_runner::config::StockSource;
use newslab_runner::loader::{try_load_news, try_load_stock_csv};
use newslab_runner::pipeline::build_scorer;
use newslab_runner::provider::DataProvider;
use newslab_runner::{
    download_symbols, export_indicators_csv, export_scored_news_csv, run_analysis,
    save_artifacts, AnalysisConfig, AnalysisResult, StdoutProgress, YahooProvider,
};

#[derive(Parser)]
#[command(
    name = "newslab",
    about = "NewsLab CLI — news sentiment vs. stock returns"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download daily prices from Yahoo Finance as CSV.
    Download {
        /// Symbols to download (e.g., AAPL MSFT NVDA).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD). Defaults to one year ago.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<String>,

        /// Force re-download even if the file exists.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Output directory. Defaults to ./data/stocks.
        #[arg(long, default_value = "data/stocks")]
        out_dir: PathBuf,
    },
    /// Compute technical indicators for one price CSV.
    Indicators {
        /// Price CSV with a Date column and OHLCV columns.
        #[arg(long)]
        input: PathBuf,

        /// Symbol label. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Indicator backend: full or basic.
        #[arg(long, default_value = "full")]
        backend: BackendKind,

        /// Output CSV. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Clean and score a news file (CSV or JSON).
    Sentiment {
        /// News file.
        #[arg(long)]
        news: PathBuf,

        /// Extra keyword boosts (word,polarity,subjectivity).
        #[arg(long)]
        lexicon: Option<PathBuf>,

        /// Output CSV. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the full sentiment/returns analysis.
    Analyze {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// News file (CSV or JSON).
        #[arg(long)]
        news: Option<PathBuf>,

        /// Symbols to analyse.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        /// Directory of {SYMBOL}.csv price files.
        #[arg(long)]
        stock_dir: Option<PathBuf>,

        /// Fetch prices from Yahoo Finance instead of reading CSV files.
        #[arg(long, default_value_t = false)]
        download: bool,

        /// Start date (YYYY-MM-DD) for the news window.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD) for the news window.
        #[arg(long)]
        end: Option<String>,

        /// Indicator backend: full or basic.
        #[arg(long)]
        backend: Option<BackendKind>,

        /// Join key: date_and_symbol or date.
        #[arg(long)]
        join: Option<JoinKey>,

        /// Trading days between news and the paired return.
        #[arg(long)]
        lag: Option<usize>,

        /// Use synthetic prices where real ones are unavailable.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Output directory for artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            start,
            end,
            force,
            out_dir,
        } => run_download(symbols, start, end, force, out_dir),
        Commands::Indicators {
            input,
            symbol,
            backend,
            output,
        } => run_indicators(&input, symbol, backend, output.as_deref()),
        Commands::Sentiment {
            news,
            lexicon,
            output,
        } => run_sentiment(news, lexicon, output.as_deref()),
        Commands::Analyze {
            config,
            news,
            symbols,
            stock_dir,
            download,
            start,
            end,
            backend,
            join,
            lag,
            synthetic,
            output_dir,
        } => {
            let mut cfg = match config {
                Some(path) => AnalysisConfig::from_file(&path)?,
                None => AnalysisConfig::default(),
            };
            if news.is_some() {
                cfg.data.news_path = news;
            }
            if !symbols.is_empty() {
                cfg.data.symbols = symbols;
            }
            if let Some(dir) = stock_dir {
                cfg.data.stock_dir = dir;
            }
            if download {
                cfg.data.source = StockSource::Provider;
            }
            if let Some(s) = parse_date_arg(start.as_deref())? {
                cfg.data.start = Some(s);
            }
            if let Some(e) = parse_date_arg(end.as_deref())? {
                cfg.data.end = Some(e);
            }
            if let Some(b) = backend {
                cfg.indicators.backend = b;
            }
            if let Some(j) = join {
                cfg.alignment.join = j;
            }
            if let Some(l) = lag {
                cfg.alignment.lag = l;
            }
            if synthetic {
                cfg.data.synthetic_fallback = true;
            }
            if let Some(dir) = output_dir {
                cfg.output.dir = dir;
            }
            run_analyze(&cfg)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_date_arg(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
    })
    .transpose()
}

fn write_or_print(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote output");
        }
        None => print!("{contents}"),
    }
    Ok(())
}

fn run_download(
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    force: bool,
    out_dir: PathBuf,
) -> Result<()> {
    let end_date = parse_date_arg(end.as_deref())?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let start_date = parse_date_arg(start.as_deref())?
        .unwrap_or_else(|| end_date - chrono::Duration::days(365));
    if end_date < start_date {
        bail!("--end ({end_date}) is before --start ({start_date})");
    }

    let provider = YahooProvider::new()?;
    let progress = StdoutProgress;

    let normalized: Vec<String> = symbols
        .iter()
        .map(|s| newslab_core::domain::normalize_symbol(s))
        .collect();
    let sym_refs: Vec<&str> = normalized.iter().map(|s| s.as_str()).collect();

    let summary = download_symbols(
        &provider, &out_dir, &sym_refs, start_date, end_date, force, &progress,
    );

    if !summary.all_succeeded() {
        for (sym, err) in &summary.errors {
            eprintln!("Error for {sym}: {err}");
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run_indicators(
    input: &Path,
    symbol: Option<String>,
    backend: BackendKind,
    output: Option<&Path>,
) -> Result<()> {
    let symbol = match symbol {
        Some(s) => s,
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .context("cannot infer symbol from input path; pass --symbol")?,
    };
    let raw = try_load_stock_csv(input, &symbol)?;
    let (series, report) = clean_stock_with_report(&raw);
    if series.is_empty() {
        bail!("no usable price rows in {}", input.display());
    }
    info!(
        symbol = series.symbol(),
        kept = report.kept,
        dropped = report.dropped(),
        "cleaned prices"
    );

    let table = IndicatorEngine::new(backend).compute_indicators(&series);
    if !table.has_indicators() {
        eprintln!(
            "WARNING: {} lacks {:?}; indicator columns left empty",
            input.display(),
            series.columns().missing()
        );
    }
    write_or_print(output, &export_indicators_csv(&table.rows())?)
}

fn run_sentiment(news: PathBuf, lexicon: Option<PathBuf>, output: Option<&Path>) -> Result<()> {
    let mut cfg = AnalysisConfig::default();
    cfg.sentiment.lexicon_path = lexicon;
    let scorer = build_scorer(&cfg)?;

    let raw = try_load_news(&news)?;
    let (records, report) = clean_news_with_report(&raw);
    let scored = scorer.score_news(&records);
    let labels = label_distribution(&scored);

    eprintln!(
        "{} articles kept ({} dropped): {} positive, {} negative, {} neutral",
        report.kept,
        report.dropped(),
        labels.positive,
        labels.negative,
        labels.neutral
    );
    write_or_print(output, &export_scored_news_csv(&scored)?)
}

fn run_analyze(config: &AnalysisConfig) -> Result<()> {
    let provider = match config.data.source {
        StockSource::Provider => Some(YahooProvider::new()?),
        _ => None,
    };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);

    let result = run_analysis(config, provider_ref)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, &config.output)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn fmt_stat(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.4}")
    } else {
        "n/a".into()
    }
}

fn print_summary(result: &AnalysisResult) {
    println!();
    println!("=== Sentiment Analysis ===");
    println!("Model:          {}", result.sentiment_model);
    println!("Join:           {} (lag {})", result.join, result.lag);
    println!(
        "Articles:       {} kept, {} dropped",
        result.news_report.kept,
        result.news_report.dropped()
    );
    let labels = &result.label_distribution;
    println!(
        "Labels:         {} positive / {} negative / {} neutral",
        labels.positive, labels.negative, labels.neutral
    );
    println!();
    println!(
        "{:<8} {:>5} {:>10} {:>10} {:>10} {:>10}",
        "Symbol", "N", "Pearson", "p", "Spearman", "p"
    );
    println!("{}", "-".repeat(58));
    for s in &result.symbols {
        let c = &s.correlation;
        println!(
            "{:<8} {:>5} {:>10} {:>10} {:>10} {:>10}",
            s.symbol,
            c.n_observations,
            fmt_stat(c.pearson_corr),
            fmt_stat(c.pearson_pvalue),
            fmt_stat(c.spearman_corr),
            fmt_stat(c.spearman_pvalue),
        );
    }
    if result.symbols.len() > 1 {
        let c = &result.pooled;
        println!(
            "{:<8} {:>5} {:>10} {:>10} {:>10} {:>10}",
            "pooled",
            c.n_observations,
            fmt_stat(c.pearson_corr),
            fmt_stat(c.pearson_pvalue),
            fmt_stat(c.spearman_corr),
            fmt_stat(c.spearman_pvalue),
        );
    }
    if result.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for warn in &result.data_quality_warnings {
        println!("WARNING: {warn}");
    }
    println!();
}
