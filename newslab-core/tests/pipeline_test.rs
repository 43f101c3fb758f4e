//! End-to-end pass through every stage on small hand-built inputs.
//!
//! raw rows -> clean -> score -> aggregate -> align -> correlate

use chrono::NaiveDate;

use newslab_core::align::{aggregate_daily, align, align_with_lag, JoinKey};
use newslab_core::domain::{PriceColumns, RawNewsRow, RawStockRow, RawStockTable, SentimentLabel};
use newslab_core::indicators::{BackendKind, IndicatorEngine};
use newslab_core::preprocess::{clean_news, clean_news_with_report, clean_stock};
use newslab_core::sentiment::SentimentScorer;
use newslab_core::stats::{correlate, fit_trend_line};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn price(date: &str, close: f64) -> RawStockRow {
    RawStockRow {
        date: Some(date.to_string()),
        open: Some(close),
        high: Some(close + 1.0),
        low: Some(close - 1.0),
        close: Some(close),
        volume: Some(1_000_000.0),
    }
}

fn aapl_prices() -> RawStockTable {
    RawStockTable::new(
        "AAPL",
        PriceColumns::ALL,
        vec![price("2024-01-01", 145.0), price("2024-01-02", 150.0)],
    )
}

#[test]
fn positive_headline_aligns_with_up_day() {
    let news = clean_news(&[RawNewsRow::new("Stocks surge on strong earnings", "2024-01-02", "AAPL")]);
    assert_eq!(news.len(), 1);

    let scorer = SentimentScorer::default();
    let scored = scorer.score_news(&news);
    assert_eq!(scored[0].sentiment.label, SentimentLabel::Positive);

    let series = clean_stock(&aapl_prices());
    let ret = series.rows()[1].daily_return;
    assert!((ret - (150.0 / 145.0 - 1.0)).abs() < 1e-12);
    assert!((ret - 0.0345).abs() < 1e-4);

    let daily = aggregate_daily(&scored);
    let aligned = align(&daily, &series, JoinKey::DateAndSymbol);
    assert_eq!(aligned.len(), 1);
    let obs = &aligned[0];
    assert_eq!(obs.date, day(2));
    assert_eq!(obs.stock_symbol, "AAPL");
    assert!(obs.avg_sentiment > 0.1);
    assert_eq!(obs.article_count, 1);
    assert!(obs.std_sentiment.is_nan());
    assert!((obs.daily_return - ret).abs() < 1e-15);

    // A single pair is not enough for a coefficient.
    let result = correlate(&aligned);
    assert_eq!(result.n_observations, 1);
    assert!(!result.is_defined());
    assert!(fit_trend_line(&[obs.avg_sentiment], &[obs.daily_return]).is_none());
}

#[test]
fn empty_news_flows_through_every_stage() {
    let news = clean_news(&[]);
    let scored = SentimentScorer::default().score_news(&news);
    let daily = aggregate_daily(&scored);
    let aligned = align(&daily, &clean_stock(&aapl_prices()), JoinKey::DateAndSymbol);
    assert!(news.is_empty() && scored.is_empty() && daily.is_empty() && aligned.is_empty());

    let result = correlate(&aligned);
    assert_eq!(result.n_observations, 0);
    assert!(result.pearson_corr.is_nan());
    assert!(result.spearman_pvalue.is_nan());
}

#[test]
fn duplicated_article_counts_once() {
    let row = RawNewsRow::new("Stocks surge on strong earnings", "2024-01-02", "AAPL");
    let (news, report) = clean_news_with_report(&[row.clone(), row.clone(), row]);
    assert_eq!(news.len(), 1);
    assert_eq!(report.duplicates, 2);

    let daily = aggregate_daily(&SentimentScorer::default().score_news(&news));
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].article_count, 1);
}

#[test]
fn weekend_news_is_dropped_not_shifted() {
    // 2024-01-06 is a Saturday with no trading row.
    let news = clean_news(&[
        RawNewsRow::new("Shares plunge after weak guidance", "2024-01-06 10:00:00", "AAPL"),
        RawNewsRow::new("Stocks surge on strong earnings", "2024-01-02 09:30:00", "AAPL"),
    ]);
    let daily = aggregate_daily(&SentimentScorer::default().score_news(&news));
    assert_eq!(daily.len(), 2);

    let aligned = align(&daily, &clean_stock(&aapl_prices()), JoinKey::DateAndSymbol);
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].date, day(2));
}

#[test]
fn other_symbols_need_date_only_join() {
    let news = clean_news(&[RawNewsRow::new("Stocks surge on strong earnings", "2024-01-02", "msft")]);
    let daily = aggregate_daily(&SentimentScorer::default().score_news(&news));
    let series = clean_stock(&aapl_prices());

    assert!(align(&daily, &series, JoinKey::DateAndSymbol).is_empty());
    let by_date = align(&daily, &series, JoinKey::Date);
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].stock_symbol, "MSFT");
    assert_eq!(by_date[0].series_symbol, "AAPL");
}

#[test]
fn next_day_return_with_lag() {
    let news = clean_news(&[RawNewsRow::new("Stocks surge on strong earnings", "2024-01-01", "AAPL")]);
    let daily = aggregate_daily(&SentimentScorer::default().score_news(&news));
    let aligned = align_with_lag(&daily, &clean_stock(&aapl_prices()), JoinKey::DateAndSymbol, 1);
    assert_eq!(aligned.len(), 1);
    assert_eq!(aligned[0].date, day(1));
    assert_eq!(aligned[0].return_date, day(2));
    assert!(aligned[0].daily_return > 0.03);
}

#[test]
fn correlation_over_several_days() {
    let headlines = [
        ("2024-01-02", "Stocks surge on strong earnings"),
        ("2024-01-03", "Shares plunge after weak guidance"),
        ("2024-01-04", "Record profit lifts outlook"),
        ("2024-01-05", "Analysts warn of losses"),
    ];
    let raw: Vec<RawNewsRow> = headlines.iter().map(|(d, h)| RawNewsRow::new(h, d, "AAPL")).collect();
    let prices = RawStockTable::new(
        "AAPL",
        PriceColumns::ALL,
        vec![
            price("2024-01-01", 100.0),
            price("2024-01-02", 104.0),
            price("2024-01-03", 99.0),
            price("2024-01-04", 103.0),
            price("2024-01-05", 100.0),
        ],
    );

    let scored = SentimentScorer::default().score_news(&clean_news(&raw));
    let aligned = align(&aggregate_daily(&scored), &clean_stock(&prices), JoinKey::DateAndSymbol);
    assert_eq!(aligned.len(), 4);

    let result = correlate(&aligned);
    assert_eq!(result.n_observations, 4);
    assert!(result.pearson_corr > 0.5, "pearson = {}", result.pearson_corr);
    assert!((0.0..=1.0).contains(&result.pearson_pvalue));
    assert!(result.spearman_corr > 0.5);
}

#[test]
fn indicators_attach_to_every_row() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
    let rows = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| price(&(day(1) + chrono::Duration::days(i as i64)).to_string(), c))
        .collect();
    let series = clean_stock(&RawStockTable::new("AAPL", PriceColumns::ALL, rows));

    for kind in [BackendKind::Full, BackendKind::Basic] {
        let table = IndicatorEngine::new(kind).compute_indicators(&series);
        assert!(table.has_indicators());
        let out = table.rows();
        assert_eq!(out.len(), 60);
        let last = out[59].indicators.as_ref().unwrap();
        assert!(last.to_array().iter().all(|v| v.is_finite()), "{kind}: {last:?}");
    }
}

#[test]
fn missing_volume_column_keeps_prices_without_indicators() {
    let cols = PriceColumns {
        volume: false,
        ..PriceColumns::ALL
    };
    let rows = vec![
        RawStockRow { volume: None, ..price("2024-01-01", 145.0) },
        RawStockRow { volume: None, ..price("2024-01-02", 150.0) },
    ];
    let series = clean_stock(&RawStockTable::new("AAPL", cols, rows));
    assert_eq!(series.len(), 2);

    let table = IndicatorEngine::new(BackendKind::Full).compute_indicators(&series);
    assert!(!table.has_indicators());
    assert!(table.rows().iter().all(|r| r.indicators.is_none()));
}
