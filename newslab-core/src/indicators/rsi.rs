//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), averages over `period` close
//! deltas. Lookback: period (the first delta needs a previous close).
//! Edge cases: avg_loss == 0 with avg_gain > 0 → 100; both zero (flat prices)
//! → NaN.

use super::indicator::{closes, Indicator};
use super::rolling::{smooth, Smoothing};
use crate::domain::StockBar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: Smoothing,
    name: String,
}

impl Rsi {
    pub fn new(period: usize, smoothing: Smoothing) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            smoothing,
            name: format!("rsi_{period}"),
        }
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { f64::NAN } else { 100.0 };
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let c = closes(bars);
        let n = c.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];
        for i in 1..n {
            let delta = c[i] - c[i - 1];
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }

        let avg_gain = smooth(&gains, self.period, self.smoothing);
        let avg_loss = smooth(&losses, self.period, self.smoothing);
        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| rsi_value(g, l))
            .collect()
    }
}
