//! On-Balance Volume (OBV).
//!
//! Running total of volume signed by the close-to-close direction; flat days
//! add nothing. OBV[0] = 0.

use super::indicator::Indicator;
use crate::domain::StockBar;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[StockBar]) -> Vec<f64> {
        let mut total = 0.0;
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if i > 0 {
                    let prev = bars[i - 1].close;
                    if bar.close > prev {
                        total += bar.volume as f64;
                    } else if bar.close < prev {
                        total -= bar.volume as f64;
                    }
                }
                total
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn obv_signs_volume_by_direction() {
        let mut bars = make_bars(&[10.0, 11.0, 11.0, 9.0, 12.0]);
        for (i, bar) in bars.iter_mut().enumerate() {
            bar.volume = 100 * (i as u64 + 1);
        }
        let obv = Obv::new().compute(&bars);
        assert_approx(obv[0], 0.0, DEFAULT_EPSILON);
        assert_approx(obv[1], 200.0, DEFAULT_EPSILON);
        assert_approx(obv[2], 200.0, DEFAULT_EPSILON);
        assert_approx(obv[3], -200.0, DEFAULT_EPSILON);
        assert_approx(obv[4], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn obv_empty() {
        assert!(Obv::new().compute(&[]).is_empty());
    }
}
