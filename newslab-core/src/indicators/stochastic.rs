//! Stochastic Oscillator.
//!
//! Fast %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k)).
//! %K = SMA(fast %K, k_smoothing); %D = SMA(%K, d).
//! A zero high-low range leaves %K undefined for that bar.

use super::indicator::Indicator;
use super::rolling::{rolling_max, rolling_mean, rolling_min};
use crate::domain::StockBar;

/// Which stochastic line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    k_smoothing: usize,
    d_period: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    fn build(k_period: usize, k_smoothing: usize, d_period: usize, line: StochasticLine) -> Self {
        assert!(
            k_period >= 1 && k_smoothing >= 1 && d_period >= 1,
            "Stochastic periods must be >= 1"
        );
        let label = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            k_period,
            k_smoothing,
            d_period,
            line,
            name: format!("stoch_{label}_{k_period}_{k_smoothing}_{d_period}"),
        }
    }

    pub fn k(k_period: usize, k_smoothing: usize, d_period: usize) -> Self {
        Self::build(k_period, k_smoothing, d_period, StochasticLine::K)
    }

    pub fn d(k_period: usize, k_smoothing: usize, d_period: usize) -> Self {
        Self::build(k_period, k_smoothing, d_period, StochasticLine::D)
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let k = self.k_period - 1 + self.k_smoothing - 1;
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => k + self.d_period - 1,
        }
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let hh = rolling_max(&highs, self.k_period);
        let ll = rolling_min(&lows, self.k_period);

        let fast_k: Vec<f64> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                let range = hh[i] - ll[i];
                if range.is_nan() || range == 0.0 {
                    f64::NAN
                } else {
                    100.0 * (bar.close - ll[i]) / range
                }
            })
            .collect();

        let k = rolling_mean(&fast_k, self.k_smoothing);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => rolling_mean(&k, self.d_period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn fast_k_at_top_of_range_is_100() {
        // Rising closes: close is always at the top of the window minus the
        // +1 high padding from make_bars.
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let k = Stochastic::k(5, 1, 3).compute(&bars);
        assert!(k[3].is_nan());
        // Window 0..=4: HH = 15, LL = 9, close = 14 → 100 * 5/6
        assert_approx(k[4], 100.0 * 5.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn d_is_sma_of_k() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).sin() * 4.0).collect();
        let bars = make_bars(&closes);
        let k = Stochastic::k(14, 3, 3).compute(&bars);
        let d = Stochastic::d(14, 3, 3).compute(&bars);
        assert!(k[14].is_nan());
        assert!(k[15].is_finite());
        assert!(d[16].is_nan());
        for i in 17..40 {
            assert_approx(d[i], (k[i] + k[i - 1] + k[i - 2]) / 3.0, 1e-9);
        }
    }

    #[test]
    fn zero_range_is_undefined() {
        let mut bars = make_bars(&[10.0; 6]);
        for bar in &mut bars {
            bar.high = bar.close;
            bar.low = bar.close;
        }
        let k = Stochastic::k(3, 1, 3).compute(&bars);
        assert!(k.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn lookbacks() {
        assert_eq!(Stochastic::k(14, 3, 3).lookback(), 15);
        assert_eq!(Stochastic::d(14, 3, 3).lookback(), 17);
        assert_eq!(Stochastic::k(14, 1, 3).lookback(), 13);
        assert_eq!(Stochastic::d(14, 1, 3).lookback(), 15);
    }
}
