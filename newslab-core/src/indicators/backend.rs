//! Interchangeable indicator backends.
//!
//! Both backends emit the same fifteen columns. The full backend follows
//! library-grade technical-analysis conventions (SMA-seeded EMAs, Wilder
//! smoothing, population deviation, slow stochastic); the basic backend is
//! the plain-arithmetic variant (first-value EMAs, rolling means, sample
//! deviation, fast stochastic).
//!
//! `full-backend` is a build-time switch over code in this crate, not an
//! optional library dependency. Without it `select_backend(Full)` returns
//! the basic backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::indicator::{Indicator, IndicatorValues};
use super::rolling::{EmaSeed, Smoothing};
use super::{
    Atr, Bollinger, Deviation, Ema, Macd, Obv, Rsi, Sma, Stochastic, ATR, BB_LOWER, BB_MIDDLE,
    BB_UPPER, EMA_12, EMA_26, MACD, MACD_HIST, MACD_SIGNAL, OBV, RSI, SMA_20, SMA_50, STOCH_D,
    STOCH_K,
};
use crate::domain::StockBar;

/// A set of indicators producing the standard columns.
pub trait IndicatorBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Column name and indicator, in output order.
    fn indicators(&self) -> Vec<(&'static str, Box<dyn Indicator>)>;

    fn compute(&self, bars: &[StockBar]) -> IndicatorValues {
        let mut values = IndicatorValues::new();
        for (column, indicator) in self.indicators() {
            values.insert(column, indicator.compute(bars));
        }
        values
    }
}

struct Params {
    ema_seed: EmaSeed,
    smoothing: Smoothing,
    deviation: Deviation,
    k_smoothing: usize,
}

fn standard_set(p: Params) -> Vec<(&'static str, Box<dyn Indicator>)> {
    vec![
        (SMA_20, Box::new(Sma::new(20)) as Box<dyn Indicator>),
        (SMA_50, Box::new(Sma::new(50))),
        (EMA_12, Box::new(Ema::new(12, p.ema_seed))),
        (EMA_26, Box::new(Ema::new(26, p.ema_seed))),
        (RSI, Box::new(Rsi::new(14, p.smoothing))),
        (MACD, Box::new(Macd::line(12, 26, 9, p.ema_seed))),
        (MACD_SIGNAL, Box::new(Macd::signal(12, 26, 9, p.ema_seed))),
        (MACD_HIST, Box::new(Macd::histogram(12, 26, 9, p.ema_seed))),
        (BB_UPPER, Box::new(Bollinger::upper(20, 2.0, p.deviation))),
        (BB_MIDDLE, Box::new(Bollinger::middle(20, 2.0, p.deviation))),
        (BB_LOWER, Box::new(Bollinger::lower(20, 2.0, p.deviation))),
        (STOCH_K, Box::new(Stochastic::k(14, p.k_smoothing, 3))),
        (STOCH_D, Box::new(Stochastic::d(14, p.k_smoothing, 3))),
        (ATR, Box::new(Atr::new(14, p.smoothing))),
        (OBV, Box::new(Obv::new())),
    ]
}

#[cfg(feature = "full-backend")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FullBackend;

#[cfg(feature = "full-backend")]
impl IndicatorBackend for FullBackend {
    fn name(&self) -> &'static str {
        "full"
    }

    fn indicators(&self) -> Vec<(&'static str, Box<dyn Indicator>)> {
        standard_set(Params {
            ema_seed: EmaSeed::Sma,
            smoothing: Smoothing::Wilder,
            deviation: Deviation::Population,
            k_smoothing: 3,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicBackend;

impl IndicatorBackend for BasicBackend {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn indicators(&self) -> Vec<(&'static str, Box<dyn Indicator>)> {
        standard_set(Params {
            ema_seed: EmaSeed::FirstValue,
            smoothing: Smoothing::Simple,
            deviation: Deviation::Sample,
            k_smoothing: 1,
        })
    }
}

/// Backend choice as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Full,
    Basic,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Basic => "basic",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "basic" => Ok(Self::Basic),
            other => Err(format!("unknown indicator backend '{other}' (expected full or basic)")),
        }
    }
}

/// Instantiate a backend. Asking for `Full` in a build without the
/// `full-backend` feature falls back to `Basic` with a warning.
pub fn select_backend(kind: BackendKind) -> Box<dyn IndicatorBackend> {
    match kind {
        #[cfg(feature = "full-backend")]
        BackendKind::Full => Box::new(FullBackend),
        #[cfg(not(feature = "full-backend"))]
        BackendKind::Full => {
            tracing::warn!("full indicator backend not compiled in, falling back to basic");
            Box::new(BasicBackend)
        }
        BackendKind::Basic => Box::new(BasicBackend),
    }
}
