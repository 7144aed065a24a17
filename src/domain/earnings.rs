//! Earnings calendar returned by the market-data provider.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EarningsCalendar {
    pub ticker: String,
    pub earnings_dates: Vec<NaiveDate>,
    pub eps_average: Option<f64>,
    pub eps_low: Option<f64>,
    pub eps_high: Option<f64>,
    pub revenue_average: Option<f64>,
}

impl EarningsCalendar {
    /// Earnings dates on or after `today`, ascending.
    pub fn upcoming(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .earnings_dates
            .iter()
            .copied()
            .filter(|d| *d >= today)
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn is_empty(&self) -> bool {
        self.earnings_dates.is_empty()
            && self.eps_average.is_none()
            && self.eps_low.is_none()
            && self.eps_high.is_none()
            && self.revenue_average.is_none()
    }
}
