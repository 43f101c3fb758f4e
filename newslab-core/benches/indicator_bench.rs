//! Criterion benchmarks for NewsLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator backends (full vs basic, whole standard set)
//! 2. Single indicators (SMA, EMA, RSI, Stochastic)
//! 3. Sentiment scoring (VADER model over a headline batch)
//! 4. Alignment + correlation (daily aggregation, join, Pearson/Spearman)

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use newslab_core::align::{aggregate_daily, align, JoinKey};
use newslab_core::domain::{
    NewsRecord, PriceColumns, ScoredNews, SentimentScore, StockBar, StockRow, StockSeries,
};
use newslab_core::indicators::{
    BackendKind, Ema, EmaSeed, Indicator, IndicatorEngine, Rsi, Sma, Smoothing, Stochastic,
};
use newslab_core::sentiment::SentimentScorer;
use newslab_core::stats::correlate;

// ── Helpers ──────────────────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 2).unwrap()
}

fn make_bars(n: usize) -> Vec<StockBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            StockBar {
                date: base_date() + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn make_series(n: usize) -> StockSeries {
    let rows = make_bars(n)
        .into_iter()
        .map(|b| StockRow {
            open: Some(b.open),
            high: Some(b.high),
            low: Some(b.low),
            close: Some(b.close),
            volume: Some(b.volume),
            ..StockRow::new(b.date)
        })
        .collect();
    StockSeries::new("BENCH", PriceColumns::ALL, rows)
}

const HEADLINES: &[&str] = &[
    "Stocks surge on strong earnings",
    "Shares plunge after weak guidance",
    "Fed holds rates steady",
    "Analysts warn of slowing growth",
    "Record profit lifts outlook",
    "Company is not doing badly at all!",
];

fn make_news(n: usize, days: usize) -> Vec<NewsRecord> {
    (0..n)
        .map(|i| {
            let headline = HEADLINES[i % HEADLINES.len()].to_string();
            let date = base_date() + chrono::Duration::days((i % days) as i64);
            NewsRecord {
                headline_length: headline.chars().count(),
                headline,
                publisher: None,
                url: None,
                timestamp: date.and_hms_opt(9, 30, 0).unwrap(),
                stock_symbol: "BENCH".to_string(),
                date,
                publication_hour: 9,
                publication_day: "Monday".to_string(),
            }
        })
        .collect()
}

// ── 1. Indicator Backends ────────────────────────────────────────────

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_backend");

    for &bar_count in &[252, 1260, 2520] {
        let series = make_series(bar_count);
        for kind in [BackendKind::Full, BackendKind::Basic] {
            let engine = IndicatorEngine::new(kind);
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), bar_count),
                &bar_count,
                |b, _| {
                    b.iter(|| engine.compute_indicators(black_box(&series)));
                },
            );
        }
    }

    group.finish();
}

// ── 2. Single Indicators ─────────────────────────────────────────────

fn bench_single_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_indicator");
    let bars = make_bars(2520);

    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(26, EmaSeed::Sma)),
        Box::new(Rsi::new(14, Smoothing::Wilder)),
        Box::new(Stochastic::d(14, 3, 3)),
    ];
    for ind in &indicators {
        group.bench_function(ind.name(), |b| {
            b.iter(|| ind.compute(black_box(&bars)));
        });
    }

    group.finish();
}

// ── 3. Sentiment Scoring ─────────────────────────────────────────────

fn bench_sentiment(c: &mut Criterion) {
    let mut group = c.benchmark_group("sentiment");
    let scorer = SentimentScorer::default();

    for &count in &[1_000, 10_000] {
        let news = make_news(count, 250);
        group.bench_with_input(BenchmarkId::new("score_news", count), &count, |b, _| {
            b.iter(|| scorer.score_news(black_box(&news)));
        });
    }

    group.finish();
}

// ── 4. Alignment + Correlation ───────────────────────────────────────

fn bench_align_correlate(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_correlate");
    let series = make_series(2520);
    let scored: Vec<ScoredNews> = make_news(20_000, 2520)
        .into_iter()
        .enumerate()
        .map(|(i, news)| ScoredNews {
            news,
            sentiment: SentimentScore::new(((i % 21) as f64 - 10.0) / 10.0, 0.5),
        })
        .collect();

    group.bench_function("aggregate_daily_20k", |b| {
        b.iter(|| aggregate_daily(black_box(&scored)));
    });

    let daily = aggregate_daily(&scored);
    group.bench_function("align_2520_days", |b| {
        b.iter(|| align(black_box(&daily), black_box(&series), JoinKey::DateAndSymbol));
    });

    let aligned = align(&daily, &series, JoinKey::DateAndSymbol);
    group.bench_function("correlate_2520_pairs", |b| {
        b.iter(|| correlate(black_box(&aligned)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_backends,
    bench_single_indicators,
    bench_sentiment,
    bench_align_correlate,
);
criterion_main!(benches);
