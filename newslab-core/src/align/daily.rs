use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DailySentimentSummary, ScoredNews, SentimentLabel};

/// Group scored articles by (date, symbol) into daily summaries, sorted by
/// date then symbol. Articles within a group keep input order.
pub fn aggregate_daily(scored: &[ScoredNews]) -> Vec<DailySentimentSummary> {
    let mut groups: BTreeMap<(NaiveDate, &str), Vec<&ScoredNews>> = BTreeMap::new();
    for s in scored {
        groups
            .entry((s.news.date, s.news.stock_symbol.as_str()))
            .or_default()
            .push(s);
    }

    let summaries: Vec<DailySentimentSummary> = groups
        .into_iter()
        .map(|((date, symbol), articles)| {
            let polarities: Vec<f64> = articles.iter().map(|a| a.sentiment.polarity).collect();
            let labels: Vec<SentimentLabel> = articles.iter().map(|a| a.sentiment.label).collect();
            DailySentimentSummary {
                date,
                stock_symbol: symbol.to_string(),
                avg_sentiment: mean(&polarities),
                std_sentiment: sample_std(&polarities),
                article_count: articles.len(),
                dominant_sentiment: dominant_label(&labels).unwrap_or(SentimentLabel::Neutral),
            }
        })
        .collect();

    debug!(
        articles = scored.len(),
        groups = summaries.len(),
        "aggregated daily sentiment"
    );
    summaries
}

/// Most frequent label; ties go to the label seen first.
pub fn dominant_label(labels: &[SentimentLabel]) -> Option<SentimentLabel> {
    // (label, count) in first-seen order
    let counts = labels.iter().fold(Vec::<(SentimentLabel, usize)>::new(), |mut acc, &l| {
        match acc.iter_mut().find(|(seen, _)| *seen == l) {
            Some((_, n)) => *n += 1,
            None => acc.push((l, 1)),
        }
        acc
    });
    counts
        .into_iter()
        .fold(None, |best: Option<(SentimentLabel, usize)>, (l, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((l, n)),
        })
        .map(|(l, _)| l)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; NaN below two values.
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewsRecord, SentimentScore};
    use chrono::NaiveTime;

    fn scored(day: u32, symbol: &str, polarity: f64) -> ScoredNews {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let timestamp = date.and_time(NaiveTime::MIN);
        ScoredNews {
            news: NewsRecord {
                headline: format!("h {polarity}"),
                publisher: None,
                url: None,
                timestamp,
                stock_symbol: symbol.to_string(),
                date,
                headline_length: 3,
                publication_hour: 0,
                publication_day: "Tuesday".into(),
            },
            sentiment: SentimentScore::new(polarity, 0.5),
        }
    }

    #[test]
    fn groups_by_date_and_symbol() {
        let input = vec![
            scored(3, "AAPL", 0.5),
            scored(2, "MSFT", -0.5),
            scored(2, "AAPL", 0.2),
            scored(2, "AAPL", 0.4),
        ];
        let out = aggregate_daily(&input);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].stock_symbol, "AAPL");
        assert_eq!(out[0].article_count, 2);
        assert!((out[0].avg_sentiment - 0.3).abs() < 1e-12);
        assert!((out[0].std_sentiment - (0.02f64).sqrt()).abs() < 1e-12);
        assert_eq!(out[1].stock_symbol, "MSFT");
        assert_eq!(out[2].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn single_article_std_is_undefined() {
        let out = aggregate_daily(&[scored(2, "AAPL", 0.5)]);
        assert_eq!(out[0].article_count, 1);
        assert!(out[0].std_sentiment.is_nan());
        assert_eq!(out[0].dominant_sentiment, SentimentLabel::Positive);
    }

    #[test]
    fn empty_input() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn dominant_tie_goes_to_first_seen() {
        use SentimentLabel::*;
        assert_eq!(dominant_label(&[Negative, Positive, Positive, Negative]), Some(Negative));
        assert_eq!(dominant_label(&[Neutral, Positive, Positive]), Some(Positive));
        assert_eq!(dominant_label(&[]), None);
    }

    #[test]
    fn dominant_follows_input_order_within_group() {
        let out = aggregate_daily(&[scored(2, "X", -0.5), scored(2, "X", 0.5)]);
        assert_eq!(out[0].dominant_sentiment, SentimentLabel::Negative);
        let out = aggregate_daily(&[scored(2, "X", 0.5), scored(2, "X", -0.5)]);
        assert_eq!(out[0].dominant_sentiment, SentimentLabel::Positive);
    }
}
