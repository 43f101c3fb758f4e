//! Reporting and export: JSON, CSV, and Markdown artifacts.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: indicator tables, scored news, daily sentiment, aligned rows
//! - **Markdown**: human-readable run report
//!
//! Persisted JSON carries a `schema_version`; newer versions are rejected on
//! load. Undefined numbers are written as empty CSV cells and JSON `null`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use newslab_core::align::{NEWS_SUFFIX, STOCK_SUFFIX};
use newslab_core::domain::{AlignedObservation, DailySentimentSummary, ScoredNews};
use newslab_core::indicators::{IndicatorRow, COLUMNS};
use newslab_core::stats::CorrelationResult;

use crate::chart::CorrelationChart;
use crate::config::OutputConfig;
use crate::pipeline::{AnalysisResult, SCHEMA_VERSION};

fn num(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        String::new()
    }
}

fn opt_num(v: Option<f64>) -> String {
    v.map(num).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize AnalysisResult to JSON")
}

/// Deserialize an `AnalysisResult`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisResult> {
    let result: AnalysisResult =
        serde_json::from_str(json).context("failed to deserialize AnalysisResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

pub fn export_chart_json(chart: &CorrelationChart) -> Result<String> {
    serde_json::to_string_pretty(chart).context("failed to serialize chart data")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Indicator table: the OHLCV columns, returns, then every indicator column.
/// Indicator cells are empty when undefined or when the series had no
/// indicators at all.
pub fn export_indicators_csv(rows: &[IndicatorRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "daily_return",
        "daily_return_pct",
    ];
    header.extend(COLUMNS);
    wtr.write_record(&header)?;

    for row in rows {
        let s = &row.stock;
        let mut record = vec![
            s.date.to_string(),
            opt_num(s.open),
            opt_num(s.high),
            opt_num(s.low),
            opt_num(s.close),
            s.volume.map(|v| v.to_string()).unwrap_or_default(),
            num(s.daily_return),
            num(s.daily_return_pct),
        ];
        match &row.indicators {
            Some(point) => record.extend(point.to_array().into_iter().map(num)),
            None => record.extend(COLUMNS.iter().map(|_| String::new())),
        }
        wtr.write_record(&record)?;
    }

    finish(wtr)
}

pub fn export_scored_news_csv(scored: &[ScoredNews]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "timestamp",
        "stock_symbol",
        "headline",
        "publisher",
        "url",
        "headline_length",
        "publication_hour",
        "publication_day",
        "polarity",
        "subjectivity",
        "sentiment_label",
    ])?;

    for s in scored {
        let n = &s.news;
        wtr.write_record([
            n.date.to_string(),
            n.timestamp.to_string(),
            n.stock_symbol.clone(),
            n.headline.clone(),
            n.publisher.clone().unwrap_or_default(),
            n.url.clone().unwrap_or_default(),
            n.headline_length.to_string(),
            n.publication_hour.to_string(),
            n.publication_day.clone(),
            format!("{:.6}", s.sentiment.polarity),
            format!("{:.6}", s.sentiment.subjectivity),
            s.sentiment.label.to_string(),
        ])?;
    }

    finish(wtr)
}

pub fn export_daily_csv(daily: &[DailySentimentSummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "stock_symbol",
        "avg_sentiment",
        "std_sentiment",
        "article_count",
        "dominant_sentiment",
    ])?;
    for d in daily {
        wtr.write_record([
            d.date.to_string(),
            d.stock_symbol.clone(),
            num(d.avg_sentiment),
            num(d.std_sentiment),
            d.article_count.to_string(),
            d.dominant_sentiment.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Aligned rows. `stock_symbol` exists on both sides of the join, so it is
/// written twice with the news and stock suffixes.
pub fn export_aligned_csv(aligned: &[AlignedObservation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let news_symbol = format!("stock_symbol{NEWS_SUFFIX}");
    let stock_symbol = format!("stock_symbol{STOCK_SUFFIX}");
    wtr.write_record([
        "date",
        news_symbol.as_str(),
        stock_symbol.as_str(),
        "avg_sentiment",
        "std_sentiment",
        "article_count",
        "dominant_sentiment",
        "return_date",
        "close",
        "daily_return",
        "daily_return_pct",
    ])?;
    for o in aligned {
        wtr.write_record([
            o.date.to_string(),
            o.stock_symbol.clone(),
            o.series_symbol.clone(),
            num(o.avg_sentiment),
            num(o.std_sentiment),
            o.article_count.to_string(),
            o.dominant_sentiment.to_string(),
            o.return_date.to_string(),
            opt_num(o.close),
            num(o.daily_return),
            num(o.daily_return_pct),
        ])?;
    }
    finish(wtr)
}

// ─── Markdown report ────────────────────────────────────────────────

fn fmt_stat(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.4}")
    } else {
        "n/a".into()
    }
}

fn correlation_row(name: &str, c: &CorrelationResult) -> String {
    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        name,
        c.n_observations,
        fmt_stat(c.pearson_corr),
        fmt_stat(c.pearson_pvalue),
        fmt_stat(c.spearman_corr),
        fmt_stat(c.spearman_pvalue),
    )
}

pub fn export_markdown(result: &AnalysisResult) -> String {
    let labels = &result.label_distribution;
    let mut report = format!(
        "# NewsLab Sentiment Report\n\n\
Run ID: `{}`\n\
Dataset: `{}`\n\n\
## Summary\n\
- Sentiment model: {}\n\
- Join: {} (lag {} trading days)\n\
- Articles scored: {}\n\
- Labels: {} positive / {} negative / {} neutral\n\
- Daily summaries: {}\n",
        result.run_id,
        result.dataset_hash,
        result.sentiment_model,
        result.join,
        result.lag,
        result.scored_news.len(),
        labels.positive,
        labels.negative,
        labels.neutral,
        result.daily_sentiment.len(),
    );
    if result.has_synthetic {
        report.push_str("- **SYNTHETIC DATA**: at least one price series is synthetic\n");
    }

    report.push_str("\n## Correlation\n\n");
    report.push_str("| Symbol | N | Pearson r | Pearson p | Spearman ρ | Spearman p |\n");
    report.push_str("|--------|---|-----------|-----------|------------|------------|\n");
    for s in &result.symbols {
        report.push_str(&correlation_row(&s.symbol, &s.correlation));
    }
    if result.symbols.len() > 1 {
        report.push_str(&correlation_row("**pooled**", &result.pooled));
    }

    report.push_str("\n## Data Sources\n\n");
    report.push_str("| Symbol | Source | Rows | Dropped | Indicators |\n");
    report.push_str("|--------|--------|------|---------|------------|\n");
    for s in &result.symbols {
        report.push_str(&format!(
            "| {} | {:?} | {} | {} | {} |\n",
            s.symbol,
            s.source,
            s.stock_report.kept,
            s.stock_report.dropped(),
            if s.has_indicators { s.indicator_backend.as_str() } else { "skipped" },
        ));
    }

    if !result.data_quality_warnings.is_empty() {
        report.push_str("\n## Warnings\n\n");
        for w in &result.data_quality_warnings {
            report.push_str(&format!("- {w}\n"));
        }
    }

    report.push_str(
        "\n## Notes\n\
- Correlation is association only; returns are not detrended.\n\
- Tables and chart data are exported alongside this report.\n",
    );

    report
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a run under `{output.dir}/run_{id}/`:
/// - `result.json`: the full `AnalysisResult`
/// - `scored_news.csv`, `daily_sentiment.csv`, `aligned.csv`
/// - `{SYMBOL}_indicators.csv`, `{SYMBOL}_aligned.csv`
/// - `report.md`
/// - `chart.json`, `{SYMBOL}_chart.json`
///
/// CSV, report, and chart files are each switched by `output`. Returns the
/// created directory.
pub fn save_artifacts(result: &AnalysisResult, output: &OutputConfig) -> Result<PathBuf> {
    let short_id = result.run_id.get(..12).unwrap_or(&result.run_id);
    let run_dir = output.dir.join(format!("run_{short_id}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir, "result.json", &export_json(result)?)?;

    if output.csv {
        write(&run_dir, "scored_news.csv", &export_scored_news_csv(&result.scored_news)?)?;
        write(&run_dir, "daily_sentiment.csv", &export_daily_csv(&result.daily_sentiment)?)?;
        let pooled: Vec<AlignedObservation> = result.aligned().cloned().collect();
        write(&run_dir, "aligned.csv", &export_aligned_csv(&pooled)?)?;
        for s in &result.symbols {
            write(
                &run_dir,
                &format!("{}_indicators.csv", s.symbol),
                &export_indicators_csv(&s.indicators)?,
            )?;
            write(
                &run_dir,
                &format!("{}_aligned.csv", s.symbol),
                &export_aligned_csv(&s.aligned)?,
            )?;
        }
    }

    if output.report {
        write(&run_dir, "report.md", &export_markdown(result))?;
    }

    if output.chart {
        let pooled: Vec<AlignedObservation> = result.aligned().cloned().collect();
        let chart = CorrelationChart::from_aligned("Sentiment vs Returns", &pooled);
        write(&run_dir, "chart.json", &export_chart_json(&chart)?)?;
        for s in &result.symbols {
            let chart = CorrelationChart::from_aligned(&s.symbol, &s.aligned);
            write(&run_dir, &format!("{}_chart.json", s.symbol), &export_chart_json(&chart)?)?;
        }
    }

    Ok(run_dir)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
