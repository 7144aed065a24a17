//! Daily price bars and the validated per-ticker series.

use crate::domain::error::DashboardError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// All prices finite and non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Date-ordered bars for one ticker. Dates are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, DashboardError> {
        let ticker = ticker.into();

        if let Some(bad) = bars.iter().find(|b| !b.is_well_formed()) {
            return Err(DashboardError::InvalidSeries {
                ticker,
                reason: format!("bar on {} has a negative or non-finite price", bad.date),
            });
        }

        if let Some(w) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            let reason = if w[1].date == w[0].date {
                format!("duplicate date {}", w[1].date)
            } else {
                format!("date {} follows {}", w[1].date, w[0].date)
            };
            return Err(DashboardError::InvalidSeries { ticker, reason });
        }

        Ok(Self { ticker, bars })
    }

    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            bars: Vec::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Sort by date, keep the last bar for a repeated date and drop malformed bars.
///
/// Providers occasionally repeat the most recent session or emit rows with
/// missing fields; this brings raw provider output in line with
/// [`PriceSeries`] invariants.
pub fn normalize_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(PriceBar::is_well_formed);
    bars.sort_by_key(|b| b.date);

    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
