//! NewsLab Core — domain types, preprocessing, sentiment, indicators,
//! alignment and correlation.
//!
//! This crate is pure computation over in-memory tables:
//! - Domain types (news rows, price series, sentiment, aligned observations)
//! - Preprocessor: dedup, malformed-row dropping, derived fields
//! - SentimentScorer with a pluggable model; VADER plus financial keywords by default
//! - IndicatorEngine with interchangeable full/basic backends (the
//!   `full-backend` feature is a build-time switch, not an optional library)
//! - Aligner: daily aggregation and the strict date join
//! - CorrelationAnalyzer: Pearson/Spearman with p-values, trend-line fit
//!
//! No stage fails on a single bad input; rows are dropped and statistics
//! reported as NaN instead.

pub mod align;
pub mod domain;
pub mod indicators;
pub mod preprocess;
pub mod sentiment;
pub mod stats;
