//! Memoizing wrapper around any [`DataPort`].
//!
//! Successful price fetches are kept per `(ticker, start, end)`. Earnings
//! lookups pass straight through, as do errors, which are never stored.

use crate::domain::analysis::CacheKey;
use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub struct CachedDataPort<P: DataPort> {
    inner: P,
    entries: RefCell<HashMap<CacheKey, Vec<PriceBar>>>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            entries: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, DashboardError> {
        let key = (ticker.to_uppercase(), start_date, end_date);

        if let Some(bars) = self.entries.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            tracing::debug!(%ticker, %start_date, %end_date, "price cache hit");
            return Ok(bars.clone());
        }

        self.misses.set(self.misses.get() + 1);
        tracing::debug!(%ticker, %start_date, %end_date, "price cache miss");
        let bars = self.inner.fetch_history(ticker, start_date, end_date)?;
        self.entries.borrow_mut().insert(key, bars.clone());
        Ok(bars)
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError> {
        self.inner.fetch_earnings(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingPort {
        calls: Cell<usize>,
        fail: bool,
    }

    impl DataPort for CountingPort {
        fn fetch_history(
            &self,
            ticker: &str,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> Result<Vec<PriceBar>, DashboardError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(DashboardError::DataFetch {
                    ticker: ticker.to_string(),
                    reason: "offline".into(),
                });
            }
            Ok(vec![PriceBar {
                date: start_date,
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 0,
            }])
        }

        fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError> {
            Ok(EarningsCalendar {
                ticker: ticker.to_string(),
                ..Default::default()
            })
        }
    }

    fn port(fail: bool) -> CachedDataPort<CountingPort> {
        CachedDataPort::new(CountingPort {
            calls: Cell::new(0),
            fail,
        })
    }

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, 1).unwrap()
    }

    #[test]
    fn same_key_fetches_once() {
        let cache = port(false);
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();

        assert_eq!(cache.inner().calls.get(), 1);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn ticker_case_shares_entry() {
        let cache = port(false);
        cache.fetch_history("aapl", d(1), d(6)).unwrap();
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();
        assert_eq!(cache.inner().calls.get(), 1);
    }

    #[test]
    fn any_key_change_refetches() {
        let cache = port(false);
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();
        cache.fetch_history("MSFT", d(1), d(6)).unwrap();
        cache.fetch_history("AAPL", d(2), d(6)).unwrap();
        cache.fetch_history("AAPL", d(1), d(7)).unwrap();

        assert_eq!(cache.inner().calls.get(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = port(true);
        assert!(cache.fetch_history("AAPL", d(1), d(6)).is_err());
        assert!(cache.fetch_history("AAPL", d(1), d(6)).is_err());

        assert_eq!(cache.inner().calls.get(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_forces_refetch() {
        let cache = port(false);
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();
        cache.clear();
        cache.fetch_history("AAPL", d(1), d(6)).unwrap();
        assert_eq!(cache.inner().calls.get(), 2);
    }

    #[test]
    fn earnings_pass_through() {
        let cache = port(false);
        assert_eq!(cache.fetch_earnings("AAPL").unwrap().ticker, "AAPL");
    }
}
