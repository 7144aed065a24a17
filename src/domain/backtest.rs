//! Signal-to-portfolio accounting.
//!
//! Today's return is earned only if yesterday's signal was long, so the
//! strategy never trades on information from the bar it is applied to.

use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::SignalState;
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub date: NaiveDate,
    pub daily_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub portfolio_value: f64,
}

/// Close[i]/Close[i-1] - 1, `None` on the first bar or after a zero close.
pub fn daily_returns(bars: &[PriceBar]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        if i == 0 || bars[i - 1].close <= 0.0 {
            out.push(None);
        } else {
            out.push(Some(bars[i].close / bars[i - 1].close - 1.0));
        }
    }
    out
}

pub fn run_backtest(
    bars: &[PriceBar],
    signals: &[SignalState],
    config: &BacktestConfig,
) -> Vec<PortfolioState> {
    let returns = daily_returns(bars);
    let mut states = Vec::with_capacity(bars.len());
    let mut value = config.initial_cash;

    for (i, bar) in bars.iter().enumerate() {
        let strategy_return = if i == 0 {
            None
        } else {
            let exposure = signals.get(i - 1).map_or(0, |s| s.flag()) as f64;
            returns[i].map(|r| r * exposure)
        };

        if let Some(r) = strategy_return {
            value *= 1.0 + r;
        }

        states.push(PortfolioState {
            date: bar.date,
            daily_return: returns[i],
            strategy_return,
            portfolio_value: value,
        });
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::SignalState::*;

    fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn default_config() {
        assert_eq!(BacktestConfig::default().initial_cash, 10_000.0);
    }

    #[test]
    fn daily_returns_first_is_none() {
        let returns = daily_returns(&make_bars(&[100.0, 110.0, 99.0]));
        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 0.10).abs() < 1e-12);
        assert!((returns[2].unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn daily_returns_after_zero_close() {
        let returns = daily_returns(&make_bars(&[0.0, 5.0]));
        assert_eq!(returns[1], None);
    }

    #[test]
    fn return_is_lagged_by_one_day() {
        let bars = make_bars(&[100.0, 110.0, 121.0, 133.1]);
        let signals = [Flat, Long, Long, Flat];
        let states = run_backtest(&bars, &signals, &BacktestConfig::default());

        assert_eq!(states[0].strategy_return, None);
        assert_eq!(states[0].portfolio_value, 10_000.0);
        // signal on day 0 was flat, so day 1's +10% is not earned
        assert_eq!(states[1].strategy_return, Some(0.0));
        assert_eq!(states[1].portfolio_value, 10_000.0);
        assert!((states[2].portfolio_value - 11_000.0).abs() < 1e-6);
        assert!((states[3].portfolio_value - 12_100.0).abs() < 1e-6);
    }

    #[test]
    fn flat_signal_keeps_value_constant() {
        let bars = make_bars(&[100.0, 50.0, 200.0, 10.0]);
        let signals = [Undefined, Flat, Flat, Flat];
        let states = run_backtest(&bars, &signals, &BacktestConfig::default());
        for s in &states {
            assert_eq!(s.portfolio_value, 10_000.0);
        }
    }

    #[test]
    fn custom_initial_cash() {
        let bars = make_bars(&[10.0, 20.0]);
        let config = BacktestConfig {
            initial_cash: 500.0,
        };
        let states = run_backtest(&bars, &[Long, Long], &config);
        assert!((states[1].portfolio_value - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input() {
        assert!(run_backtest(&[], &[], &BacktestConfig::default()).is_empty());
    }
}
