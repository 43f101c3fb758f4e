//! CorrelationAnalyzer: linear and rank correlation with two-sided
//! significance, plus the least-squares trend line used for display.

pub mod correlation;
pub mod distribution;
pub mod trend;

pub use correlation::{correlate, correlate_pairs, pearson, rank_average, spearman, CorrelationResult};
pub use distribution::{t_cdf, two_sided_t_pvalue};
pub use trend::{fit_trend_line, TrendLine};
