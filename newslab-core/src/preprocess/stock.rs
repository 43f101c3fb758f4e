use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{normalize_symbol, parse_date, RawStockRow, RawStockTable, StockRow, StockSeries};

/// What `clean_stock` dropped, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCleaningReport {
    pub input_rows: usize,
    pub bad_dates: usize,
    /// Rows missing a value in a column the table carries.
    pub missing_values: usize,
    /// Negative or non-finite prices and volumes.
    pub invalid_values: usize,
    pub duplicate_dates: usize,
    pub kept: usize,
    /// Kept rows whose high/low do not bound open and close. Not dropped.
    #[serde(default)]
    pub inconsistent_ohlc: usize,
}

impl StockCleaningReport {
    pub fn dropped(&self) -> usize {
        self.input_rows - self.kept
    }
}

/// Clean a raw price table. See [`clean_stock_with_report`].
pub fn clean_stock(table: &RawStockTable) -> StockSeries {
    clean_stock_with_report(table).0
}

/// Clean a raw price table into a date-ordered series.
///
/// Only columns the table carries are required; a row missing one of them is
/// dropped. Returns are derived after sorting, so the first row's return is
/// always NaN.
pub fn clean_stock_with_report(table: &RawStockTable) -> (StockSeries, StockCleaningReport) {
    let columns = table.columns;
    let mut report = StockCleaningReport {
        input_rows: table.rows.len(),
        ..Default::default()
    };

    let mut rows = Vec::with_capacity(table.rows.len());
    for raw in &table.rows {
        match clean_row(raw, &table.columns) {
            Ok(row) => rows.push(row),
            Err(RowFault::BadDate) => report.bad_dates += 1,
            Err(RowFault::Missing) => report.missing_values += 1,
            Err(RowFault::Invalid) => report.invalid_values += 1,
        }
    }

    let (series, duplicates) = StockSeries::build(normalize_symbol(&table.symbol), columns, rows);
    report.duplicate_dates = duplicates;
    report.kept = series.len();
    report.inconsistent_ohlc = series
        .bars()
        .map(|bars| bars.iter().filter(|b| !b.is_sane()).count())
        .unwrap_or(0);

    if report.dropped() > 0 {
        warn!(
            symbol = %series.symbol(),
            bad_dates = report.bad_dates,
            missing_values = report.missing_values,
            invalid_values = report.invalid_values,
            duplicate_dates = report.duplicate_dates,
            "dropped {} of {} price rows",
            report.dropped(),
            report.input_rows
        );
    } else {
        debug!(symbol = %series.symbol(), rows = report.kept, "price rows clean");
    }
    if report.inconsistent_ohlc > 0 {
        warn!(
            symbol = %series.symbol(),
            rows = report.inconsistent_ohlc,
            "kept price rows with inconsistent OHLC ranges"
        );
    }
    (series, report)
}

enum RowFault {
    BadDate,
    Missing,
    Invalid,
}

fn clean_row(
    raw: &RawStockRow,
    columns: &crate::domain::PriceColumns,
) -> Result<StockRow, RowFault> {
    let date = raw
        .date
        .as_deref()
        .and_then(|d| parse_date(d).ok())
        .ok_or(RowFault::BadDate)?;

    let mut row = StockRow::new(date);
    row.open = field(columns.open, raw.open)?;
    row.high = field(columns.high, raw.high)?;
    row.low = field(columns.low, raw.low)?;
    row.close = field(columns.close, raw.close)?;
    row.volume = field(columns.volume, raw.volume)?.map(|v| v.round() as u64);
    Ok(row)
}

/// A carried column must have a finite, non-negative value. Values of
/// uncarried columns are ignored.
fn field(carried: bool, value: Option<f64>) -> Result<Option<f64>, RowFault> {
    if !carried {
        return Ok(None);
    }
    match value {
        None => Err(RowFault::Missing),
        Some(v) if v.is_nan() => Err(RowFault::Missing),
        Some(v) if !v.is_finite() || v < 0.0 => Err(RowFault::Invalid),
        Some(v) => Ok(Some(v)),
    }
}
