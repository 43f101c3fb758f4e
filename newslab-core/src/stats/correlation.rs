//! Pearson and Spearman correlation over complete pairs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::distribution::two_sided_t_pvalue;
use crate::domain::{nan, AlignedObservation};

/// Correlation of sentiment against return. Fields are NaN when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    #[serde(with = "nan")]
    pub pearson_corr: f64,
    #[serde(with = "nan")]
    pub pearson_pvalue: f64,
    #[serde(with = "nan")]
    pub spearman_corr: f64,
    #[serde(with = "nan")]
    pub spearman_pvalue: f64,
    pub n_observations: usize,
}

impl CorrelationResult {
    /// All statistics undefined, with the number of valid pairs seen.
    pub fn undefined(n_observations: usize) -> Self {
        Self {
            pearson_corr: f64::NAN,
            pearson_pvalue: f64::NAN,
            spearman_corr: f64::NAN,
            spearman_pvalue: f64::NAN,
            n_observations,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.pearson_corr.is_finite()
    }

    /// Pearson p-value below `alpha`. False when undefined.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.pearson_pvalue < alpha
    }
}

/// Correlate `avg_sentiment` with `daily_return` across aligned rows.
pub fn correlate(aligned: &[AlignedObservation]) -> CorrelationResult {
    let (x, y): (Vec<f64>, Vec<f64>) = aligned
        .iter()
        .map(|o| (o.avg_sentiment, o.daily_return))
        .unzip();
    correlate_pairs(&x, &y)
}

/// Correlate two paired series, keeping only pairs where both values are
/// finite. Unpaired trailing values of the longer slice are ignored.
pub fn correlate_pairs(x: &[f64], y: &[f64]) -> CorrelationResult {
    let (x, y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip();
    let n = x.len();
    if n < 2 {
        debug!(n, "too few pairs for correlation");
        return CorrelationResult::undefined(n);
    }

    let (pearson_corr, pearson_pvalue) = pearson(&x, &y);
    let (spearman_corr, spearman_pvalue) = spearman(&x, &y);
    CorrelationResult {
        pearson_corr,
        pearson_pvalue,
        spearman_corr,
        spearman_pvalue,
        n_observations: n,
    }
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn is_constant(v: &[f64]) -> bool {
    v.iter().all(|&a| a == v[0])
}

fn coefficient(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 || is_constant(x) || is_constant(y) {
        return f64::NAN;
    }
    let (mx, my) = (mean(x), mean(y));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// p-value of r under H0: no correlation, t = r·sqrt((n-2)/(1-r²)).
fn r_pvalue(r: f64, n: usize) -> f64 {
    if r.is_nan() || n < 3 {
        return f64::NAN;
    }
    if r.abs() == 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    two_sided_t_pvalue(r * (df / (1.0 - r * r)).sqrt(), df)
}

/// Pearson r and two-sided p-value. Two points always fit a line, so n = 2
/// gives p = 1. Constant input gives NaN for both.
pub fn pearson(x: &[f64], y: &[f64]) -> (f64, f64) {
    let r = coefficient(x, y);
    if r.is_nan() {
        return (f64::NAN, f64::NAN);
    }
    if x.len() == 2 {
        return (r, 1.0);
    }
    (r, r_pvalue(r, x.len()))
}

/// Spearman rho (Pearson on average ranks) and its t-approximation p-value;
/// the p-value is NaN for n = 2.
pub fn spearman(x: &[f64], y: &[f64]) -> (f64, f64) {
    let rho = coefficient(&rank_average(x), &rank_average(y));
    (rho, r_pvalue(rho, x.len()))
}

/// 1-based ranks; ties share the mean of the ranks they span.
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1 ..= end
        let shared = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = shared;
        }
        start = end;
    }
    ranks
}
