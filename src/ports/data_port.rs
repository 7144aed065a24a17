//! Market data access port trait.

use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `ticker` within `[start_date, end_date]`. Implementations
    /// return bars sorted by date with duplicate dates removed.
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, DashboardError>;

    fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError>;
}

impl<T: DataPort + ?Sized> DataPort for Box<T> {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, DashboardError> {
        (**self).fetch_history(ticker, start_date, end_date)
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError> {
        (**self).fetch_earnings(ticker)
    }
}
