//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Lookback: period - 1. A flat window has zero deviation, so all three bands
//! coincide.

use serde::{Deserialize, Serialize};

use super::indicator::{closes, Indicator};
use super::rolling::{rolling_mean, rolling_std};
use crate::domain::StockBar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

/// Divisor of the window variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deviation {
    /// Divide by N.
    Population,
    /// Divide by N - 1.
    Sample,
}

impl Deviation {
    fn ddof(self) -> usize {
        match self {
            Self::Population => 0,
            Self::Sample => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    deviation: Deviation,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn build(period: usize, multiplier: f64, deviation: Deviation, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            deviation,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64, deviation: Deviation) -> Self {
        Self::build(period, multiplier, deviation, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64, deviation: Deviation) -> Self {
        Self::build(period, multiplier, deviation, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64, deviation: Deviation) -> Self {
        Self::build(period, multiplier, deviation, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let c = closes(bars);
        let middle = rolling_mean(&c, self.period);
        if self.band == BollingerBand::Middle {
            return middle;
        }
        let sign = if self.band == BollingerBand::Upper { 1.0 } else { -1.0 };
        let std = rolling_std(&c, self.period, self.deviation.ddof());
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}
