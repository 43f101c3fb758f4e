//! IndicatorEngine: technical indicators over daily OHLCV bars.
//!
//! Every indicator implements the single-series `Indicator` trait. Multi-line
//! indicators (MACD, Bollinger, Stochastic) are exposed as separate named
//! instances per line. A backend bundles one configuration of all of them
//! under the standard column names.

pub mod atr;
pub mod backend;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod indicator;
pub mod macd;
pub mod obv;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use atr::Atr;
#[cfg(feature = "full-backend")]
pub use backend::FullBackend;
pub use backend::{select_backend, BackendKind, BasicBackend, IndicatorBackend};
pub use bollinger::{Bollinger, BollingerBand, Deviation};
pub use ema::Ema;
pub use engine::{IndicatorEngine, IndicatorPoint, IndicatorRow, IndicatorTable};
pub use indicator::{Indicator, IndicatorValues};
pub use macd::{Macd, MacdSeries};
pub use obv::Obv;
pub use rolling::{EmaSeed, Smoothing};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::{Stochastic, StochasticLine};

// ─── Column names ───

pub const SMA_20: &str = "SMA_20";
pub const SMA_50: &str = "SMA_50";
pub const EMA_12: &str = "EMA_12";
pub const EMA_26: &str = "EMA_26";
pub const RSI: &str = "RSI";
pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_signal";
pub const MACD_HIST: &str = "MACD_hist";
pub const BB_UPPER: &str = "BB_upper";
pub const BB_MIDDLE: &str = "BB_middle";
pub const BB_LOWER: &str = "BB_lower";
pub const STOCH_K: &str = "Stoch_K";
pub const STOCH_D: &str = "Stoch_D";
pub const ATR: &str = "ATR";
pub const OBV: &str = "OBV";

/// All indicator columns in output order.
pub const COLUMNS: [&str; 15] = [
    SMA_20, SMA_50, EMA_12, EMA_26, RSI, MACD, MACD_SIGNAL, MACD_HIST, BB_UPPER, BB_MIDDLE,
    BB_LOWER, STOCH_K, STOCH_D, ATR, OBV,
];

// ─── Test helpers ───

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::StockBar> {
    use crate::domain::StockBar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            StockBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// The same bars wrapped in a cleaned series.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::StockSeries {
    use crate::domain::{PriceColumns, StockRow, StockSeries};
    let rows = make_bars(closes)
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
    StockSeries::new("TEST", PriceColumns::ALL, rows)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
