//! SentimentScorer: headline text to polarity, subjectivity and label.

pub mod keywords;
pub mod scorer;
pub mod vader;

pub use keywords::{FinancialKeywords, KeywordMatch, LexiconEntry};
pub use scorer::{label_distribution, LabelCounts, SentimentScorer};
pub use vader::VaderModel;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SentimentError {
    #[error("invalid lexicon entry: {0}")]
    InvalidEntry(String),

    #[error("model '{model}' failed: {reason}")]
    Model { model: String, reason: String },
}

/// A polarity/subjectivity model over free text.
///
/// Implementations are stateless per call, so a scorer can fan out across
/// threads.
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw `(polarity, subjectivity)` for non-empty text.
    fn analyze(&self, text: &str) -> Result<(f64, f64), SentimentError>;
}
