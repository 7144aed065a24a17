//! Per-date indicator table built from the individual calculators.

use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, macd, rsi,
    IndicatorSeries, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;

/// Window parameters of the indicator engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_mult_x100: u32,
}

impl IndicatorParams {
    /// Crossover windows with the standard RSI, MACD and Bollinger settings.
    pub fn with_windows(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bollinger_period: bollinger::DEFAULT_PERIOD,
            bollinger_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal_line: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

impl IndicatorRow {
    pub fn undefined(date: NaiveDate) -> Self {
        Self {
            date,
            sma_short: None,
            sma_long: None,
            rsi: None,
            macd: None,
            signal_line: None,
            bb_mid: None,
            bb_upper: None,
            bb_lower: None,
        }
    }
}

pub fn compute_indicator_table(bars: &[PriceBar], params: &IndicatorParams) -> Vec<IndicatorRow> {
    let sma_short = calculate_sma(bars, params.short_window).simple_values();
    let sma_long = calculate_sma(bars, params.long_window).simple_values();
    let rsi = calculate_rsi(bars, params.rsi_period).simple_values();
    let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let bands = calculate_bollinger(bars, params.bollinger_period, params.bollinger_mult_x100);

    let (macd_line, signal_line) = macd_columns(&macd);
    let (bb_mid, bb_upper, bb_lower) = bollinger_columns(&bands);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            sma_short: sma_short[i],
            sma_long: sma_long[i],
            rsi: rsi[i],
            macd: macd_line[i],
            signal_line: signal_line[i],
            bb_mid: bb_mid[i],
            bb_upper: bb_upper[i],
            bb_lower: bb_lower[i],
        })
        .collect()
}

type Column = Vec<Option<f64>>;

fn macd_columns(series: &IndicatorSeries) -> (Column, Column) {
    series
        .values
        .iter()
        .map(|p| match (p.valid, &p.value) {
            (true, IndicatorValue::Macd { line, signal, .. }) => (Some(*line), Some(*signal)),
            _ => (None, None),
        })
        .unzip()
}

fn bollinger_columns(series: &IndicatorSeries) -> (Column, Column, Column) {
    let mut mid = Vec::with_capacity(series.values.len());
    let mut upper = Vec::with_capacity(series.values.len());
    let mut lower = Vec::with_capacity(series.values.len());

    for point in &series.values {
        match (point.valid, &point.value) {
            (
                true,
                IndicatorValue::Bollinger {
                    upper: u,
                    middle: m,
                    lower: l,
                },
            ) => {
                mid.push(Some(*m));
                upper.push(Some(*u));
                lower.push(Some(*l));
            }
            _ => {
                mid.push(None);
                upper.push(None);
                lower.push(None);
            }
        }
    }

    (mid, upper, lower)
}
