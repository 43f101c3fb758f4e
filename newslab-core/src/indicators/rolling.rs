//! Series primitives shared by the indicators.
//!
//! Every function returns a vector the length of its input, NaN where the
//! window is incomplete or contains NaN.

use serde::{Deserialize, Serialize};

/// How an average of gains, losses or true range is carried forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoothing {
    /// Seed with a simple mean, then `prev + (x - prev) / period`.
    Wilder,
    /// Plain rolling mean over the window.
    Simple,
}

/// Where a recursive EMA starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaSeed {
    /// First output at `start + span - 1`, seeded with the SMA of the first
    /// `span` values.
    Sma,
    /// First output at the first valid value, seeded with that value.
    FirstValue,
}

fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let w = &values[i + 1 - window..=i];
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = w.iter().sum::<f64>() / window as f64;
    }
    result
}

/// Rolling standard deviation with `ddof` delta degrees of freedom
/// (0 = population, 1 = sample).
pub fn rolling_std(values: &[f64], window: usize, ddof: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || window <= ddof || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let w = &values[i + 1 - window..=i];
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        // Identical values have zero spread; skip the rounding of the mean.
        if w.iter().all(|&v| v == w[0]) {
            result[i] = 0.0;
            continue;
        }
        let mean = w.iter().sum::<f64>() / window as f64;
        let ss: f64 = w.iter().map(|v| (v - mean) * (v - mean)).sum();
        result[i] = (ss / (window - ddof) as f64).sqrt();
    }
    result
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::max)
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::min)
}

fn rolling_fold(values: &[f64], window: usize, f: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let w = &values[i + 1 - window..=i];
        if w.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = w[1..].iter().copied().fold(w[0], f);
    }
    result
}

/// Exponential moving average, α = 2 / (span + 1), no bias adjustment.
///
/// Leading NaNs are skipped; a NaN after the seed taints the rest.
pub fn ema(values: &[f64], span: usize, seed: EmaSeed) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    let Some(start) = first_valid(values) else {
        return result;
    };
    if span == 0 {
        return result;
    }
    let alpha = 2.0 / (span as f64 + 1.0);

    let (seed_index, seed_value) = match seed {
        EmaSeed::FirstValue => (start, values[start]),
        EmaSeed::Sma => {
            let end = start + span - 1;
            if end >= n {
                return result;
            }
            let window = &values[start..=end];
            if window.iter().any(|v| v.is_nan()) {
                return result;
            }
            (end, window.iter().sum::<f64>() / span as f64)
        }
    };
    result[seed_index] = seed_value;

    let mut prev = seed_value;
    for i in (seed_index + 1)..n {
        if values[i].is_nan() {
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

/// Wilder smoothing (α = 1 / period), seeded with the mean of the first
/// `period` values from the first valid index.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    let Some(start) = first_valid(values) else {
        return result;
    };
    if period == 0 || start + period > n {
        return result;
    }
    let seed_window = &values[start..start + period];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let seed_index = start + period - 1;
    let mut prev = seed_window.iter().sum::<f64>() / period as f64;
    result[seed_index] = prev;

    let p = period as f64;
    for i in (seed_index + 1)..n {
        if values[i].is_nan() {
            break;
        }
        prev = (prev * (p - 1.0) + values[i]) / p;
        result[i] = prev;
    }
    result
}

/// Average with the chosen smoothing.
pub fn smooth(values: &[f64], period: usize, smoothing: Smoothing) -> Vec<f64> {
    match smoothing {
        Smoothing::Wilder => wilder(values, period),
        Smoothing::Simple => rolling_mean(values, period),
    }
}
