//! Moving Average Convergence/Divergence (MACD).
//!
//! Three series (separate Indicator instances):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//! - Histogram: line - signal
//!
//! With SMA seeding both EMAs seed on the slow lookback bar: the fast EMA's
//! seed is the mean of the `fast` closes ending there, as TA-Lib does.

use super::indicator::{closes, Indicator};
use super::rolling::{ema, EmaSeed};
use crate::domain::StockBar;

/// Which MACD series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdSeries {
    Line,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    seed: EmaSeed,
    series: MacdSeries,
    name: String,
}

impl Macd {
    fn build(fast: usize, slow: usize, signal: usize, seed: EmaSeed, series: MacdSeries) -> Self {
        assert!(fast >= 1 && slow > fast, "MACD needs 1 <= fast < slow");
        assert!(signal >= 1, "MACD signal span must be >= 1");
        let label = match series {
            MacdSeries::Line => "line",
            MacdSeries::Signal => "signal",
            MacdSeries::Histogram => "hist",
        };
        Self {
            fast,
            slow,
            signal,
            seed,
            series,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    pub fn line(fast: usize, slow: usize, signal: usize, seed: EmaSeed) -> Self {
        Self::build(fast, slow, signal, seed, MacdSeries::Line)
    }

    pub fn signal(fast: usize, slow: usize, signal: usize, seed: EmaSeed) -> Self {
        Self::build(fast, slow, signal, seed, MacdSeries::Signal)
    }

    pub fn histogram(fast: usize, slow: usize, signal: usize, seed: EmaSeed) -> Self {
        Self::build(fast, slow, signal, seed, MacdSeries::Histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match (self.seed, self.series) {
            (EmaSeed::FirstValue, _) => 0,
            (EmaSeed::Sma, MacdSeries::Line) => self.slow - 1,
            (EmaSeed::Sma, _) => self.slow - 1 + self.signal - 1,
        }
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let c = closes(bars);
        let fast = fast_ema(&c, self.fast, self.slow, self.seed);
        let slow = ema(&c, self.slow, self.seed);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        if self.series == MacdSeries::Line {
            return line;
        }

        let signal = ema(&line, self.signal, self.seed);
        match self.series {
            MacdSeries::Signal => signal,
            _ => line.iter().zip(&signal).map(|(l, s)| l - s).collect(),
        }
    }
}

/// Fast EMA, seeded on the same bar as the slow EMA when SMA-seeded.
fn fast_ema(closes: &[f64], fast: usize, slow: usize, seed: EmaSeed) -> Vec<f64> {
    match seed {
        EmaSeed::FirstValue => ema(closes, fast, seed),
        EmaSeed::Sma => {
            let skip = (slow - fast).min(closes.len());
            let mut shifted = closes.to_vec();
            shifted[..skip].fill(f64::NAN);
            ema(&shifted, fast, seed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    fn trend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.2).collect()
    }

    #[test]
    fn line_is_fast_minus_slow() {
        let bars = make_bars(&trend(60));
        let line = Macd::line(12, 26, 9, EmaSeed::Sma).compute(&bars);
        let fast = fast_ema(&closes(&bars), 12, 26, EmaSeed::Sma);
        let slow = ema(&closes(&bars), 26, EmaSeed::Sma);
        assert!(line[24].is_nan());
        for i in 25..60 {
            assert_approx(line[i], fast[i] - slow[i], DEFAULT_EPSILON);
        }
    }

    #[test]
    fn histogram_is_line_minus_signal() {
        let bars = make_bars(&trend(60));
        for seed in [EmaSeed::Sma, EmaSeed::FirstValue] {
            let line = Macd::line(12, 26, 9, seed).compute(&bars);
            let signal = Macd::signal(12, 26, 9, seed).compute(&bars);
            let hist = Macd::histogram(12, 26, 9, seed).compute(&bars);
            let first = Macd::signal(12, 26, 9, seed).lookback();
            assert!(signal[first].is_finite());
            if first > 0 {
                assert!(signal[first - 1].is_nan());
            }
            for i in first..60 {
                assert_approx(hist[i], line[i] - signal[i], DEFAULT_EPSILON);
            }
        }
    }

    #[test]
    fn fast_ema_seeds_on_slow_lookback() {
        let c = trend(40);
        let fast = fast_ema(&c, 12, 26, EmaSeed::Sma);
        assert!(fast[24].is_nan());
        let seed = c[14..26].iter().sum::<f64>() / 12.0;
        assert_approx(fast[25], seed, DEFAULT_EPSILON);
        let alpha = 2.0 / 13.0;
        assert_approx(fast[26], alpha * c[26] + (1.0 - alpha) * seed, DEFAULT_EPSILON);

        // the unaligned EMA would already be running by the slow lookback
        let unaligned = ema(&c, 12, EmaSeed::Sma);
        assert!(unaligned[11].is_finite());
        assert!((unaligned[25] - fast[25]).abs() > 1e-9);
    }

    #[test]
    fn first_value_fast_ema_is_unshifted() {
        let c = trend(30);
        let fast = fast_ema(&c, 12, 26, EmaSeed::FirstValue);
        assert_eq!(fast, ema(&c, 12, EmaSeed::FirstValue));
    }

    #[test]
    fn lookbacks() {
        assert_eq!(Macd::line(12, 26, 9, EmaSeed::Sma).lookback(), 25);
        assert_eq!(Macd::signal(12, 26, 9, EmaSeed::Sma).lookback(), 33);
        assert_eq!(Macd::histogram(12, 26, 9, EmaSeed::FirstValue).lookback(), 0);
    }
}
