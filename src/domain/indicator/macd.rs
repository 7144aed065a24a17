//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! All EMAs are seeded by their first input, so every bar is valid.

use crate::domain::indicator::{
    ema_values, invalid_series, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return invalid_series(
            indicator_type,
            bars.iter().map(|b| b.date),
            IndicatorValue::Macd {
                line: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
        );
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorPoint {
            date: bar.date,
            valid: true,
            value: IndicatorValue::Macd {
                line: macd_line[i],
                signal: signal_line[i],
                histogram: macd_line[i] - signal_line[i],
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn standard_macd(bars: &[PriceBar]) -> IndicatorSeries {
        calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
    }

    fn parts(series: &IndicatorSeries, i: usize) -> (f64, f64, f64) {
        match series.values[i].value {
            IndicatorValue::Macd {
                line,
                signal,
                histogram,
            } => (line, signal, histogram),
            _ => panic!("Expected Macd value"),
        }
    }

    #[test]
    fn macd_first_bar_is_zero() {
        let bars = make_bars(&[50.0, 51.0, 52.0]);
        let series = standard_macd(&bars);

        assert!(series.values[0].valid);
        let (line, signal, histogram) = parts(&series, 0);
        assert_eq!(line, 0.0);
        assert_eq!(signal, 0.0);
        assert_eq!(histogram, 0.0);
    }

    #[test]
    fn macd_line_is_ema_difference() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = make_bars(&prices);
        let series = calculate_macd(&bars, 3, 6, 4);

        let fast = ema_values(&prices, 3);
        let slow = ema_values(&prices, 6);
        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_values(&line, 4);

        for i in 0..prices.len() {
            let (l, s, h) = parts(&series, i);
            assert!((l - line[i]).abs() < 1e-12);
            assert!((s - signal[i]).abs() < 1e-12);
            assert!((h - (line[i] - signal[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_constant_prices_are_flat() {
        let bars = make_bars(&[75.0; 60]);
        let series = standard_macd(&bars);
        for i in 0..60 {
            let (line, signal, _) = parts(&series, i);
            assert!(line.abs() < 1e-12);
            assert!(signal.abs() < 1e-12);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let series = standard_macd(&make_bars(&prices));
        let (line, _, _) = parts(&series, 59);
        assert!(line > 0.0, "fast EMA should lead in an uptrend");
    }

    #[test]
    fn macd_zero_period() {
        let bars = make_bars(&[1.0, 2.0]);
        let series = calculate_macd(&bars, 0, 26, 9);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.valid_count(), 0);
    }

    #[test]
    fn macd_indicator_type() {
        let series = standard_macd(&[]);
        assert_eq!(
            series.indicator_type,
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
        );
        assert!(series.values.is_empty());
    }
}
