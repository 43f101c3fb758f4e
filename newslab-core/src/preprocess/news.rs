use std::collections::HashSet;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{normalize_symbol, parse_timestamp, weekday_name, NewsRecord, RawNewsRow};

/// What `clean_news` dropped, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCleaningReport {
    pub input_rows: usize,
    pub duplicates: usize,
    pub empty_headlines: usize,
    pub bad_timestamps: usize,
    pub kept: usize,
}

impl NewsCleaningReport {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.kept
    }
}

/// Clean raw news rows. See [`clean_news_with_report`].
pub fn clean_news(rows: &[RawNewsRow]) -> Vec<NewsRecord> {
    clean_news_with_report(rows).0
}

/// Clean raw news rows, keeping input order.
///
/// Rows with a blank headline or an unparseable timestamp are dropped, then
/// exact duplicates on (headline, timestamp, symbol) collapse to their first
/// occurrence.
pub fn clean_news_with_report(rows: &[RawNewsRow]) -> (Vec<NewsRecord>, NewsCleaningReport) {
    let mut report = NewsCleaningReport {
        input_rows: rows.len(),
        ..Default::default()
    };
    if rows.is_empty() {
        return (Vec::new(), report);
    }

    let mut seen: HashSet<(String, NaiveDateTime, String)> = HashSet::with_capacity(rows.len());
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let headline = match row.headline.as_deref().map(str::trim) {
            Some(h) if !h.is_empty() => h,
            _ => {
                report.empty_headlines += 1;
                continue;
            }
        };
        let Some(timestamp) = row
            .timestamp
            .as_deref()
            .and_then(|raw| parse_timestamp(raw).ok())
        else {
            report.bad_timestamps += 1;
            continue;
        };
        let symbol = row
            .stock_symbol
            .as_deref()
            .map(normalize_symbol)
            .unwrap_or_default();

        if !seen.insert((headline.to_string(), timestamp, symbol.clone())) {
            report.duplicates += 1;
            continue;
        }

        out.push(NewsRecord {
            headline: headline.to_string(),
            publisher: row.publisher.clone(),
            url: row.url.clone(),
            timestamp,
            stock_symbol: symbol,
            date: timestamp.date(),
            headline_length: headline.chars().count(),
            publication_hour: timestamp.hour(),
            publication_day: weekday_name(timestamp.weekday()).to_string(),
        });
    }

    report.kept = out.len();
    if report.dropped() > 0 {
        warn!(
            duplicates = report.duplicates,
            empty_headlines = report.empty_headlines,
            bad_timestamps = report.bad_timestamps,
            "dropped {} of {} news rows",
            report.dropped(),
            report.input_rows
        );
    } else {
        debug!(rows = report.kept, "news rows clean");
    }
    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_input_gives_empty_output() {
        let (out, report) = clean_news_with_report(&[]);
        assert!(out.is_empty());
        assert_eq!(report, NewsCleaningReport::default());
    }

    #[test]
    fn triplicates_collapse_to_one() {
        let row = RawNewsRow::new("Apple beats estimates", "2024-01-02", "AAPL");
        let (out, report) = clean_news_with_report(&[row.clone(), row.clone(), row]);
        assert_eq!(out.len(), 1);
        assert_eq!(report.duplicates, 2);
    }

    #[test]
    fn keeps_first_occurrence_in_order() {
        let mut first = RawNewsRow::new("Same headline", "2024-01-02", "AAPL");
        first.publisher = Some("first".into());
        let mut second = first.clone();
        second.publisher = Some("second".into());
        let other = RawNewsRow::new("Other", "2024-01-01", "AAPL");

        let out = clean_news(&[first, other, second]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].publisher.as_deref(), Some("first"));
        assert_eq!(out[1].headline, "Other");
    }

    #[test]
    fn drops_blank_headlines_and_bad_timestamps() {
        let rows = vec![
            RawNewsRow::new("   ", "2024-01-02", "AAPL"),
            RawNewsRow {
                headline: None,
                ..RawNewsRow::new("x", "2024-01-02", "AAPL")
            },
            RawNewsRow::new("Valid", "yesterday", "AAPL"),
            RawNewsRow {
                timestamp: None,
                ..RawNewsRow::new("No stamp", "", "AAPL")
            },
            RawNewsRow::new("Valid", "2024-01-02 09:30:00", "AAPL"),
        ];
        let (out, report) = clean_news_with_report(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(report.empty_headlines, 2);
        assert_eq!(report.bad_timestamps, 2);
    }

    #[test]
    fn derives_calendar_fields() {
        let out = clean_news(&[RawNewsRow::new(
            "  Fed holds rates  ",
            "2020-06-05 10:30:54-04:00",
            " aapl ",
        )]);
        let rec = &out[0];
        assert_eq!(rec.headline, "Fed holds rates");
        assert_eq!(rec.headline_length, 15);
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2020, 6, 5).unwrap());
        assert_eq!(rec.publication_hour, 10);
        assert_eq!(rec.publication_day, "Friday");
        assert_eq!(rec.stock_symbol, "AAPL");
    }

    #[test]
    fn headline_length_counts_chars_not_bytes() {
        let out = clean_news(&[RawNewsRow::new("Café résumé", "2024-01-02", "X")]);
        assert_eq!(out[0].headline_length, 11);
    }

    #[test]
    fn cleaning_is_idempotent() {
        let rows = vec![
            RawNewsRow::new("A", "2024-01-02 10:00:00.250", "AAPL"),
            RawNewsRow::new("A", "2024-01-02 10:00:00.250", "AAPL"),
            RawNewsRow::new("B", "01/03/2024", "msft"),
        ];
        let once = clean_news(&rows);
        let again: Vec<RawNewsRow> = once.iter().map(RawNewsRow::from).collect();
        assert_eq!(clean_news(&again), once);
    }
}
