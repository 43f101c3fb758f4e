use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SentimentModel, VaderModel};
use crate::domain::{NewsRecord, ScoredNews, SentimentLabel, SentimentScore};

/// Wraps a [`SentimentModel`] with the neutral-default contract: empty text,
/// model errors and non-finite output all score as neutral.
pub struct SentimentScorer {
    model: Box<dyn SentimentModel>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(Box::new(VaderModel::new()))
    }
}

impl std::fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentScorer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl SentimentScorer {
    pub fn new(model: Box<dyn SentimentModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn score(&self, text: Option<&str>) -> SentimentScore {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return SentimentScore::neutral(),
        };
        match self.model.analyze(text) {
            Ok((polarity, subjectivity)) if polarity.is_finite() && subjectivity.is_finite() => {
                SentimentScore::new(polarity, subjectivity)
            }
            Ok((polarity, subjectivity)) => {
                warn!(model = self.model.name(), polarity, subjectivity, "non-finite sentiment, using neutral");
                SentimentScore::neutral()
            }
            Err(e) => {
                warn!(model = self.model.name(), error = %e, "sentiment scoring failed, using neutral");
                SentimentScore::neutral()
            }
        }
    }

    /// Score every article in parallel; output order matches input order.
    pub fn score_news(&self, news: &[NewsRecord]) -> Vec<ScoredNews> {
        let scored: Vec<ScoredNews> = news
            .par_iter()
            .map(|record| ScoredNews {
                sentiment: self.score(Some(&record.headline)),
                news: record.clone(),
            })
            .collect();
        debug!(articles = scored.len(), model = self.model.name(), "scored news");
        scored
    }
}

/// Article counts per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl LabelCounts {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }
}

pub fn label_distribution(scored: &[ScoredNews]) -> LabelCounts {
    scored.iter().fold(LabelCounts::default(), |mut acc, s| {
        match s.sentiment.label {
            SentimentLabel::Positive => acc.positive += 1,
            SentimentLabel::Negative => acc.negative += 1,
            SentimentLabel::Neutral => acc.neutral += 1,
        }
        acc
    })
}
