//! Indicator trait and the ordered container of computed columns.
//!
//! Indicators are pure functions: bar history in, numeric series out, one
//! value per bar.

use crate::domain::StockBar;

/// A single-series technical indicator.
///
/// The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on bar t+1 or later. Every indicator must
/// pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[StockBar]) -> Vec<f64>;
}

/// Close prices of a bar slice.
pub fn closes(bars: &[StockBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Named indicator columns in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    columns: Vec<(String, Vec<f64>)>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named column; an existing column of the same name is replaced
    /// in place.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.columns.push((name, values)),
        }
    }

    /// Value of a column at a bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get_series(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Number of columns stored.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(
            "SMA_20",
            vec![f64::NAN; 19]
                .into_iter()
                .chain(vec![100.0, 101.0])
                .collect(),
        );
        assert!(iv.get("SMA_20", 0).unwrap().is_nan());
        assert_eq!(iv.get("SMA_20", 19), Some(100.0));
        assert_eq!(iv.get("SMA_20", 21), None); // out of bounds
        assert_eq!(iv.get("nonexistent", 0), None);
    }

    #[test]
    fn keeps_insertion_order_and_replaces() {
        let mut iv = IndicatorValues::new();
        iv.insert("b", vec![1.0]);
        iv.insert("a", vec![2.0]);
        iv.insert("b", vec![3.0]);
        assert_eq!(iv.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(iv.get("b", 0), Some(3.0));
        assert_eq!(iv.len(), 2);
    }
}
