//! CSV directory data adapter.
//!
//! Reads `{base_path}/{TICKER}.csv` in the Yahoo download layout
//! (`Date,Open,High,Low,Close,Adj Close,Volume`, any column order).

use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::ohlcv::{normalize_bars, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker.to_uppercase()))
    }

    fn locate_columns(ticker: &str, headers: &StringRecord) -> Result<Columns, DashboardError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| DashboardError::DataFetch {
                    ticker: ticker.to_string(),
                    reason: format!("missing {} column", name),
                })
        };
        Ok(Columns {
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            volume: find("Volume")?,
        })
    }

    /// `None` for incomplete rows (blank or `null` cells), which are skipped.
    fn parse_row(
        ticker: &str,
        cols: &Columns,
        record: &StringRecord,
    ) -> Result<Option<PriceBar>, DashboardError> {
        let cell = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        };

        let (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            cell(cols.date),
            cell(cols.open),
            cell(cols.high),
            cell(cols.low),
            cell(cols.close),
            cell(cols.volume),
        ) else {
            return Ok(None);
        };

        let bad = |field: &str, value: &str| DashboardError::DataFetch {
            ticker: ticker.to_string(),
            reason: format!("invalid {} value '{}'", field, value),
        };

        let date =
            NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| bad("date", date))?;
        let price = |field: &str, value: &str| value.parse::<f64>().map_err(|_| bad(field, value));
        // Some exports write volume as a float.
        let volume = volume
            .parse::<u64>()
            .or_else(|_| volume.parse::<f64>().map(|v| v.max(0.0).round() as u64))
            .map_err(|_| bad("volume", volume))?;

        Ok(Some(PriceBar {
            date,
            open: price("open", open)?,
            high: price("high", high)?,
            low: price("low", low)?,
            close: price("close", close)?,
            volume,
        }))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, DashboardError> {
        let path = self.csv_path(ticker);
        tracing::debug!(path = %path.display(), "reading price csv");
        let content = fs::read_to_string(&path).map_err(|e| DashboardError::DataFetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?
            .clone();
        let cols = Self::locate_columns(ticker, &headers)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            if let Some(bar) = Self::parse_row(ticker, &cols, &record)? {
                if bar.date >= start_date && bar.date <= end_date {
                    bars.push(bar);
                }
            }
        }

        Ok(normalize_bars(bars))
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError> {
        Err(DashboardError::EarningsUnavailable {
            ticker: ticker.to_string(),
            reason: "the csv data source has no earnings calendar".to_string(),
        })
    }
}
