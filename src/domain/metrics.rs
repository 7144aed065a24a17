//! Summary metrics of a backtest run.

use super::backtest::PortfolioState;
use super::ohlcv::PriceBar;
use super::signal::Transition;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub cumulative_return: f64,
    /// Drawdown of the raw close price against its running peak (buy-and-hold),
    /// independent of the strategy's exposure.
    pub max_drawdown: Option<f64>,
    /// Drawdown of the strategy's portfolio value against its running peak.
    pub strategy_max_drawdown: Option<f64>,
    pub buy_and_hold_return: Option<f64>,
    pub total_trades: usize,
    pub buy_count: usize,
    pub sell_count: usize,
    pub final_value: f64,
}

impl Metrics {
    pub fn compute(
        bars: &[PriceBar],
        transitions: &[Option<Transition>],
        portfolio: &[PortfolioState],
        initial_cash: f64,
    ) -> Self {
        if bars.is_empty() || portfolio.is_empty() {
            return Self::neutral(initial_cash);
        }

        let final_value = portfolio
            .last()
            .map(|p| p.portfolio_value)
            .unwrap_or(initial_cash);

        let cumulative_return = if initial_cash > 0.0 && final_value.is_finite() {
            final_value / initial_cash - 1.0
        } else {
            0.0
        };

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let values: Vec<f64> = portfolio.iter().map(|p| p.portfolio_value).collect();

        let buy_and_hold_return = match (closes.first(), closes.last()) {
            (Some(&first), Some(&last)) if first > 0.0 => Some(last / first - 1.0),
            _ => None,
        };

        let buy_count = transitions
            .iter()
            .filter(|t| **t == Some(Transition::Buy))
            .count();
        let sell_count = transitions
            .iter()
            .filter(|t| **t == Some(Transition::Sell))
            .count();

        Metrics {
            cumulative_return,
            max_drawdown: max_drawdown(&closes),
            strategy_max_drawdown: max_drawdown(&values),
            buy_and_hold_return,
            total_trades: buy_count + sell_count,
            buy_count,
            sell_count,
            final_value,
        }
    }

    /// Metrics for a run with no usable history: no trades, no return, no drawdown.
    pub fn neutral(initial_cash: f64) -> Self {
        Metrics {
            cumulative_return: 0.0,
            max_drawdown: None,
            strategy_max_drawdown: None,
            buy_and_hold_return: None,
            total_trades: 0,
            buy_count: 0,
            sell_count: 0,
            final_value: initial_cash,
        }
    }
}

/// min over i of (x[i] / max(x[0..=i]) - 1). Non-positive; `None` when empty
/// or when no positive peak has been seen.
pub fn max_drawdown(series: &[f64]) -> Option<f64> {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: Option<f64> = None;

    for &x in series {
        if x > peak {
            peak = x;
        }
        if peak > 0.0 {
            let dd = x / peak - 1.0;
            worst = Some(worst.map_or(dd, |w: f64| w.min(dd)));
        }
    }

    worst
}
