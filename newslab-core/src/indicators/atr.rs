//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|); the first
//! bar has no previous close, so TR[0] = high-low.
//! Wilder smoothing seeds from TR[1..=period] (first value at index period);
//! simple smoothing is a rolling mean over all TR values (first value at
//! index period-1).

use super::indicator::Indicator;
use super::rolling::{rolling_mean, wilder, Smoothing};
use crate::domain::StockBar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    smoothing: Smoothing,
    name: String,
}

impl Atr {
    pub fn new(period: usize, smoothing: Smoothing) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            smoothing,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
pub fn true_range(bars: &[StockBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let hl = bar.high - bar.low;
            match i.checked_sub(1).map(|p| bars[p].close) {
                None => hl,
                Some(pc) => hl.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            }
        })
        .collect()
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.smoothing {
            Smoothing::Wilder => self.period,
            Smoothing::Simple => self.period.saturating_sub(1),
        }
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let mut tr = true_range(bars);
        match self.smoothing {
            Smoothing::Simple => rolling_mean(&tr, self.period),
            Smoothing::Wilder => {
                if let Some(first) = tr.first_mut() {
                    *first = f64::NAN;
                }
                wilder(&tr, self.period)
            }
        }
    }
}
