//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::{
    calculate_sma, calculate_stddev, invalid_series, IndicatorPoint, IndicatorSeries,
    IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    stddev_mult_x100: u32,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Bollinger {
        period,
        stddev_mult_x100,
    };
    let placeholder = IndicatorValue::Bollinger {
        upper: 0.0,
        middle: 0.0,
        lower: 0.0,
    };

    if period < 2 {
        return invalid_series(indicator_type, bars.iter().map(|b| b.date), placeholder);
    }

    let mult = stddev_mult_x100 as f64 / 100.0;
    let mid = calculate_sma(bars, period);
    let spread = calculate_stddev(bars, period);
    let values = bars
        .iter()
        .zip(mid.values.iter().zip(&spread.values))
        .map(|(bar, (m, sd))| match (m.simple(), sd.simple()) {
            (Some(middle), Some(stddev)) => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Bollinger {
                    upper: middle + mult * stddev,
                    middle,
                    lower: middle - mult * stddev,
                },
            },
            _ => IndicatorPoint {
                date: bar.date,
                valid: false,
                value: placeholder.clone(),
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
