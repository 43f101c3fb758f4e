//! Financial keyword boosts layered over the general-purpose model.
//!
//! Market jargon ("plunge", "downgrade", "beats") carries sentiment that a
//! social-media lexicon underrates. Each matched keyword adds its polarity
//! to a boost and reports its subjectivity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::SentimentError;

/// One keyword and its scores, as read from a `word,polarity,subjectivity`
/// file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub word: String,
    pub polarity: f64,
    pub subjectivity: f64,
}

impl LexiconEntry {
    pub fn new(word: &str, polarity: f64, subjectivity: f64) -> Self {
        Self {
            word: word.to_string(),
            polarity,
            subjectivity,
        }
    }

    pub fn validate(&self) -> Result<(), SentimentError> {
        let word = self.word.trim();
        if word.is_empty() || word.contains(char::is_whitespace) {
            return Err(SentimentError::InvalidEntry(format!(
                "word must be a single token, got '{}'",
                self.word
            )));
        }
        if !(-1.0..=1.0).contains(&self.polarity) {
            return Err(SentimentError::InvalidEntry(format!(
                "{}: polarity {} outside [-1, 1]",
                word, self.polarity
            )));
        }
        if !(0.0..=1.0).contains(&self.subjectivity) {
            return Err(SentimentError::InvalidEntry(format!(
                "{}: subjectivity {} outside [0, 1]",
                word, self.subjectivity
            )));
        }
        Ok(())
    }
}

const BULLISH_KEYWORDS: &[(&str, f64)] = &[
    ("surge", 0.4),
    ("surges", 0.4),
    ("surged", 0.4),
    ("soar", 0.5),
    ("soars", 0.5),
    ("soared", 0.5),
    ("rally", 0.4),
    ("rallies", 0.4),
    ("rallied", 0.4),
    ("jump", 0.3),
    ("jumps", 0.3),
    ("skyrocket", 0.6),
    ("skyrockets", 0.6),
    ("bullish", 0.5),
    ("breakout", 0.3),
    ("upgrade", 0.3),
    ("upgrades", 0.3),
    ("upgraded", 0.3),
    ("outperform", 0.3),
    ("beat", 0.3),
    ("beats", 0.3),
    ("profit", 0.3),
    ("profits", 0.3),
    ("lifts", 0.3),
    ("record", 0.2),
    ("dividend", 0.2),
    ("buyback", 0.3),
    ("partnership", 0.2),
    ("breakthrough", 0.4),
];

const BEARISH_KEYWORDS: &[(&str, f64)] = &[
    ("plunge", -0.5),
    ("plunges", -0.5),
    ("plunged", -0.5),
    ("crash", -0.5),
    ("crashes", -0.5),
    ("slump", -0.4),
    ("slumps", -0.4),
    ("tumble", -0.4),
    ("tumbles", -0.4),
    ("selloff", -0.4),
    ("sell-off", -0.4),
    ("bearish", -0.5),
    ("downgrade", -0.4),
    ("downgrades", -0.4),
    ("downgraded", -0.4),
    ("underperform", -0.3),
    ("miss", -0.3),
    ("misses", -0.3),
    ("loss", -0.4),
    ("losses", -0.4),
    ("warn", -0.3),
    ("warns", -0.3),
    ("lawsuit", -0.4),
    ("investigation", -0.3),
    ("recall", -0.3),
    ("layoffs", -0.4),
    ("bankruptcy", -0.6),
    ("fraud", -0.5),
];

/// Subjectivity reported for a built-in keyword.
const KEYWORD_SUBJECTIVITY: f64 = 0.5;

/// Keyword table: token to (polarity boost, subjectivity).
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialKeywords {
    words: HashMap<String, (f64, f64)>,
}

/// What a text matched in a [`FinancialKeywords`] table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordMatch {
    /// Sum of matched polarity boosts.
    pub boost: f64,
    /// Largest matched subjectivity; 0 when nothing matched.
    pub subjectivity: f64,
    pub matched: usize,
}

impl Default for FinancialKeywords {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialKeywords {
    /// The built-in bullish and bearish terms.
    pub fn new() -> Self {
        let words = BULLISH_KEYWORDS
            .iter()
            .chain(BEARISH_KEYWORDS)
            .map(|&(w, p)| (w.to_string(), (p, KEYWORD_SUBJECTIVITY)))
            .collect();
        Self { words }
    }

    /// Built-in terms plus `entries`; an entry replaces a built-in term with
    /// the same word.
    pub fn with_entries(
        entries: impl IntoIterator<Item = LexiconEntry>,
    ) -> Result<Self, SentimentError> {
        let mut keywords = Self::new();
        for entry in entries {
            entry.validate()?;
            keywords.words.insert(
                entry.word.trim().to_lowercase(),
                (entry.polarity, entry.subjectivity),
            );
        }
        Ok(keywords)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn lookup(&self, word: &str) -> Option<(f64, f64)> {
        self.words.get(&word.to_lowercase()).copied()
    }

    /// Whole-token matches only: "sec" does not fire inside "second".
    pub fn scan(&self, text: &str) -> KeywordMatch {
        let lower = text.to_lowercase();
        lower
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
            .filter(|t| !t.is_empty())
            .filter_map(|t| self.words.get(t))
            .fold(KeywordMatch::default(), |mut acc, &(p, s)| {
                acc.boost += p;
                acc.subjectivity = acc.subjectivity.max(s);
                acc.matched += 1;
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_terms_match_whole_tokens() {
        let kw = FinancialKeywords::new();
        let m = kw.scan("Shares plunge after earnings miss");
        assert_eq!(m.matched, 2);
        assert!((m.boost - (-0.8)).abs() < 1e-12);
        assert_eq!(m.subjectivity, KEYWORD_SUBJECTIVITY);

        assert_eq!(kw.scan("A second missive").matched, 0);
        assert_eq!(kw.scan("Massive sell-off hits tech").matched, 1);
    }

    #[test]
    fn no_match_is_zero() {
        assert_eq!(FinancialKeywords::new().scan("Company schedules meeting"), KeywordMatch::default());
    }

    #[test]
    fn entries_override_and_extend() {
        let kw = FinancialKeywords::with_entries([
            LexiconEntry::new("Meeting", 0.8, 0.9),
            LexiconEntry::new("plunge", -0.1, 0.2),
        ])
        .unwrap();
        assert_eq!(kw.lookup("meeting"), Some((0.8, 0.9)));
        assert_eq!(kw.lookup("PLUNGE"), Some((-0.1, 0.2)));
        let m = kw.scan("Annual meeting");
        assert_eq!(m.boost, 0.8);
        assert_eq!(m.subjectivity, 0.9);
    }

    #[test]
    fn invalid_entries_are_rejected() {
        for bad in [
            LexiconEntry::new("two words", 0.1, 0.1),
            LexiconEntry::new("", 0.1, 0.1),
            LexiconEntry::new("x", 1.5, 0.1),
            LexiconEntry::new("x", 0.1, -0.2),
        ] {
            assert!(matches!(
                FinancialKeywords::with_entries([bad]),
                Err(SentimentError::InvalidEntry(_))
            ));
        }
    }
}
