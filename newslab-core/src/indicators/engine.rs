//! IndicatorEngine: attaches the indicator columns to a cleaned price series.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::backend::{select_backend, BackendKind, IndicatorBackend};
use super::indicator::IndicatorValues;
use super::{
    ATR, BB_LOWER, BB_MIDDLE, BB_UPPER, EMA_12, EMA_26, MACD, MACD_HIST, MACD_SIGNAL, OBV, RSI,
    SMA_20, SMA_50, STOCH_D, STOCH_K,
};
use crate::domain::{nan, StockRow, StockSeries};

pub struct IndicatorEngine {
    backend: Box<dyn IndicatorBackend>,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(BackendKind::default())
    }
}

impl std::fmt::Debug for IndicatorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndicatorEngine")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl IndicatorEngine {
    pub fn new(kind: BackendKind) -> Self {
        Self::with_backend(select_backend(kind))
    }

    pub fn with_backend(backend: Box<dyn IndicatorBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Compute every indicator column for `series`.
    ///
    /// A series whose source lacked an OHLCV column is returned unchanged,
    /// without indicator values, and a warning is logged.
    pub fn compute_indicators(&self, series: &StockSeries) -> IndicatorTable {
        let values = match series.bars() {
            Ok(bars) => {
                debug!(
                    symbol = %series.symbol(),
                    bars = bars.len(),
                    backend = self.backend.name(),
                    "computing indicators"
                );
                Some(self.backend.compute(&bars))
            }
            Err(e) => {
                warn!(symbol = %series.symbol(), error = %e, "skipping indicators");
                None
            }
        };
        IndicatorTable {
            series: series.clone(),
            values,
            backend: self.backend.name().to_string(),
        }
    }
}

/// A price series with its indicator columns, if they could be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    series: StockSeries,
    values: Option<IndicatorValues>,
    backend: String,
}

impl IndicatorTable {
    pub fn series(&self) -> &StockSeries {
        &self.series
    }

    pub fn values(&self) -> Option<&IndicatorValues> {
        self.values.as_ref()
    }

    pub fn has_indicators(&self) -> bool {
        self.values.is_some()
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// One typed row per trading day.
    pub fn rows(&self) -> Vec<IndicatorRow> {
        self.series
            .rows()
            .iter()
            .enumerate()
            .map(|(i, stock)| IndicatorRow {
                stock: stock.clone(),
                indicators: self.values.as_ref().map(|v| IndicatorPoint::at(v, i)),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub stock: StockRow,
    #[serde(flatten)]
    pub indicators: Option<IndicatorPoint>,
}

/// Indicator values for one bar; NaN where undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    #[serde(rename = "SMA_20", with = "nan")]
    pub sma_20: f64,
    #[serde(rename = "SMA_50", with = "nan")]
    pub sma_50: f64,
    #[serde(rename = "EMA_12", with = "nan")]
    pub ema_12: f64,
    #[serde(rename = "EMA_26", with = "nan")]
    pub ema_26: f64,
    #[serde(rename = "RSI", with = "nan")]
    pub rsi: f64,
    #[serde(rename = "MACD", with = "nan")]
    pub macd: f64,
    #[serde(rename = "MACD_signal", with = "nan")]
    pub macd_signal: f64,
    #[serde(rename = "MACD_hist", with = "nan")]
    pub macd_hist: f64,
    #[serde(rename = "BB_upper", with = "nan")]
    pub bb_upper: f64,
    #[serde(rename = "BB_middle", with = "nan")]
    pub bb_middle: f64,
    #[serde(rename = "BB_lower", with = "nan")]
    pub bb_lower: f64,
    #[serde(rename = "Stoch_K", with = "nan")]
    pub stoch_k: f64,
    #[serde(rename = "Stoch_D", with = "nan")]
    pub stoch_d: f64,
    #[serde(rename = "ATR", with = "nan")]
    pub atr: f64,
    #[serde(rename = "OBV", with = "nan")]
    pub obv: f64,
}

impl IndicatorPoint {
    pub fn at(values: &IndicatorValues, i: usize) -> Self {
        let get = |name: &str| values.get(name, i).unwrap_or(f64::NAN);
        Self {
            sma_20: get(SMA_20),
            sma_50: get(SMA_50),
            ema_12: get(EMA_12),
            ema_26: get(EMA_26),
            rsi: get(RSI),
            macd: get(MACD),
            macd_signal: get(MACD_SIGNAL),
            macd_hist: get(MACD_HIST),
            bb_upper: get(BB_UPPER),
            bb_middle: get(BB_MIDDLE),
            bb_lower: get(BB_LOWER),
            stoch_k: get(STOCH_K),
            stoch_d: get(STOCH_D),
            atr: get(ATR),
            obv: get(OBV),
        }
    }

    /// Values in column order.
    pub fn to_array(&self) -> [f64; 15] {
        [
            self.sma_20,
            self.sma_50,
            self.ema_12,
            self.ema_26,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.bb_upper,
            self.bb_middle,
            self.bb_lower,
            self.stoch_k,
            self.stoch_d,
            self.atr,
            self.obv,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PriceColumns, StockSeries};
    use crate::indicators::{make_series, COLUMNS};

    #[test]
    fn short_series_has_undefined_long_windows() {
        let series = make_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let table = IndicatorEngine::new(BackendKind::Full).compute_indicators(&series);
        let rows = table.rows();
        assert_eq!(rows.len(), 5);
        for row in &rows {
            let p = row.indicators.unwrap();
            assert!(p.sma_20.is_nan());
            assert!(p.sma_50.is_nan());
            assert!(p.bb_upper.is_nan());
            assert!(p.rsi.is_nan());
        }
        assert_eq!(rows[0].indicators.unwrap().obv, 0.0);
    }

    #[test]
    fn missing_column_returns_series_unchanged() {
        let series = make_series(&[100.0, 101.0]);
        let cols = PriceColumns {
            volume: false,
            ..PriceColumns::ALL
        };
        let rows: Vec<StockRow> = series
            .rows()
            .iter()
            .map(|r| StockRow {
                volume: None,
                ..r.clone()
            })
            .collect();
        let partial = StockSeries::new("TEST", cols, rows);
        let table = IndicatorEngine::default().compute_indicators(&partial);
        assert!(!table.has_indicators());
        assert_eq!(table.series(), &partial);
        assert!(table.rows().iter().all(|r| r.indicators.is_none()));
    }

    #[test]
    fn point_array_follows_column_order() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let series = make_series(&closes);
        let table = IndicatorEngine::new(BackendKind::Basic).compute_indicators(&series);
        let values = table.values().unwrap();
        let point = IndicatorPoint::at(values, 55);
        for (col, v) in COLUMNS.iter().zip(point.to_array()) {
            let expected = values.get(col, 55).unwrap();
            assert!(v == expected || (v.is_nan() && expected.is_nan()), "{col}");
        }
    }

    #[test]
    fn row_json_uses_column_names() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let table = IndicatorEngine::default().compute_indicators(&make_series(&closes));
        let json = serde_json::to_value(&table.rows()[24]).unwrap();
        assert!(json["SMA_20"].is_number());
        assert!(json["SMA_50"].is_null());
        assert!(json["close"].is_number());
    }
}
