//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2/(span+1).
//! Seed is either the SMA of the first `span` closes (lookback span-1) or the
//! first close itself (lookback 0).

use super::indicator::{closes, Indicator};
use super::rolling::{ema, EmaSeed};
use crate::domain::StockBar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    seed: EmaSeed,
    name: String,
}

impl Ema {
    pub fn new(span: usize, seed: EmaSeed) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            seed,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.seed {
            EmaSeed::Sma => self.span.saturating_sub(1),
            EmaSeed::FirstValue => 0,
        }
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        ema(&closes(bars), self.span, self.seed)
    }
}
