//! VADER sentiment with a financial keyword boost.
//!
//! Polarity is VADER's compound score plus half the keyword boost, clamped
//! to [-1, 1]. Subjectivity is the non-neutral share of the text
//! (`1 - neu`), raised to the strongest matched keyword's subjectivity.

use vader_sentiment::SentimentIntensityAnalyzer;

use super::keywords::{FinancialKeywords, LexiconEntry};
use super::{SentimentError, SentimentModel};

/// Weight of the keyword boost relative to the compound score.
pub const BOOST_WEIGHT: f64 = 0.5;

pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
    keywords: FinancialKeywords,
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VaderModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaderModel")
            .field("keywords", &self.keywords.len())
            .finish()
    }
}

impl VaderModel {
    pub fn new() -> Self {
        Self::with_keywords(FinancialKeywords::new())
    }

    pub fn with_keywords(keywords: FinancialKeywords) -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
            keywords,
        }
    }

    /// Built-in keywords plus custom `word,polarity,subjectivity` entries.
    pub fn with_entries(
        entries: impl IntoIterator<Item = LexiconEntry>,
    ) -> Result<Self, SentimentError> {
        Ok(Self::with_keywords(FinancialKeywords::with_entries(entries)?))
    }

    pub fn keywords(&self) -> &FinancialKeywords {
        &self.keywords
    }
}

impl SentimentModel for VaderModel {
    fn name(&self) -> &'static str {
        "vader"
    }

    fn analyze(&self, text: &str) -> Result<(f64, f64), SentimentError> {
        let scores = self.analyzer.polarity_scores(text);
        let field = |key: &str| {
            scores.get(key).copied().ok_or_else(|| SentimentError::Model {
                model: self.name().to_string(),
                reason: format!("missing '{key}' score"),
            })
        };
        let compound = field("compound")?;
        let (pos, neg, neu) = (field("pos")?, field("neg")?, field("neu")?);

        let matched = self.keywords.scan(text);
        let polarity = (compound + matched.boost * BOOST_WEIGHT).clamp(-1.0, 1.0);

        // No scorable tokens at all leaves every share at zero.
        let opinion = if pos + neg + neu > 0.0 { 1.0 - neu } else { 0.0 };
        let subjectivity = opinion.max(matched.subjectivity).clamp(0.0, 1.0);

        Ok((polarity, subjectivity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> (f64, f64) {
        VaderModel::new().analyze(text).unwrap()
    }

    #[test]
    fn bullish_headlines_are_positive() {
        for headline in [
            "Stocks surge on strong earnings",
            "Shares soar after record profit",
            "Analysts upgrade the stock, great quarter",
        ] {
            let (p, _) = analyze(headline);
            assert!(p > 0.1, "expected positive for '{headline}', got {p}");
        }
    }

    #[test]
    fn bearish_headlines_are_negative() {
        for headline in [
            "Shares plunge after weak guidance",
            "Stock crashes on fraud lawsuit",
            "Company warns of losses",
        ] {
            let (p, _) = analyze(headline);
            assert!(p < -0.1, "expected negative for '{headline}', got {p}");
        }
    }

    #[test]
    fn plain_statement_is_neutral_and_objective() {
        let (p, s) = analyze("Company schedules annual meeting");
        assert_eq!(p, 0.0);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn keyword_boost_moves_polarity() {
        let plain = VaderModel::new();
        let boosted = VaderModel::with_entries([LexiconEntry::new("meeting", 0.8, 0.6)]).unwrap();
        let text = "Company schedules annual meeting";
        let (base, _) = plain.analyze(text).unwrap();
        let (p, s) = boosted.analyze(text).unwrap();
        assert!((p - (base + 0.8 * BOOST_WEIGHT)).abs() < 1e-12);
        assert_eq!(s, 0.6);
    }

    #[test]
    fn negation_is_handled_by_vader() {
        let (good, _) = analyze("The results are good");
        let (not_good, _) = analyze("The results are not good");
        assert!(good > 0.0);
        assert!(not_good < good);
    }

    #[test]
    fn scores_stay_in_range() {
        let (p, s) = analyze("Surge rally soar skyrocket bullish breakout upgrade, amazing!!!");
        assert!((-1.0..=1.0).contains(&p));
        assert!((0.0..=1.0).contains(&s));
        assert_eq!(p, 1.0);
    }
}
