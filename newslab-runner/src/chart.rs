//! Chart data for the correlation display: a scatter of sentiment against
//! return with a least-squares trend line, and the two series over time on
//! separate axes.
//!
//! Only data is produced here; drawing is left to whatever consumes the JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use newslab_core::domain::AlignedObservation;
use newslab_core::stats::{correlate, fit_trend_line, CorrelationResult, TrendLine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub sentiment: f64,
    pub daily_return_pct: f64,
}

/// Trend line clipped to the scatter's x range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSegment {
    pub line: TrendLine,
    pub x_start: f64,
    pub y_start: f64,
    pub x_end: f64,
    pub y_end: f64,
}

/// One step on the shared time axis of the dual-series panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub date: NaiveDate,
    pub sentiment: f64,
    pub daily_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ScatterPoint>,
    pub trend: Option<TrendSegment>,
    pub series_title: String,
    pub series: Vec<SeriesPoint>,
    pub correlation: CorrelationResult,
}

impl CorrelationChart {
    /// Build chart data from aligned rows, keeping complete pairs only.
    ///
    /// The correlation shown is recomputed from the same rows and matches
    /// `correlate(aligned)` exactly.
    pub fn from_aligned(title: &str, aligned: &[AlignedObservation]) -> Self {
        let complete: Vec<&AlignedObservation> =
            aligned.iter().filter(|o| o.is_complete()).collect();
        let correlation = correlate(aligned);

        let points: Vec<ScatterPoint> = complete
            .iter()
            .map(|o| ScatterPoint {
                date: o.date,
                symbol: o.series_symbol.clone(),
                sentiment: o.avg_sentiment,
                daily_return_pct: o.daily_return_pct,
            })
            .collect();

        let xs: Vec<f64> = points.iter().map(|p| p.sentiment).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.daily_return_pct).collect();
        let trend = fit_trend_line(&xs, &ys).map(|line| {
            let x_start = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let x_end = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            TrendSegment {
                line,
                x_start,
                y_start: line.at(x_start),
                x_end,
                y_end: line.at(x_end),
            }
        });

        let series = complete
            .iter()
            .enumerate()
            .map(|(index, o)| SeriesPoint {
                index,
                date: o.date,
                sentiment: o.avg_sentiment,
                daily_return_pct: o.daily_return_pct,
            })
            .collect();

        Self {
            title: format!(
                "{title}\nPearson r={:.3}, p={:.3}",
                correlation.pearson_corr, correlation.pearson_pvalue
            ),
            x_label: "Average Sentiment Score".into(),
            y_label: "Daily Stock Return (%)".into(),
            points,
            trend,
            series_title: "Sentiment and Returns Over Time".into(),
            series,
            correlation,
        }
    }
}
