//! Property tests over randomly generated price paths.

mod common;

use approx::relative_eq;
use common::*;
use proptest::prelude::*;
use stockdash::adapters::csv_export::{read_table, write_table};
use stockdash::domain::analysis::{analyze, AnalysisParams};
use stockdash::domain::backtest::{run_backtest, BacktestConfig};
use stockdash::domain::indicator::calculate_ema;
use stockdash::domain::indicator_table::{compute_indicator_table, IndicatorParams};
use stockdash::domain::metrics::max_drawdown;
use stockdash::domain::ohlcv::PriceSeries;
use stockdash::domain::signal::{compute_transitions, generate_signals, Transition};

fn params_with(short: usize, long: usize) -> AnalysisParams {
    let mut p = AnalysisParams::new("PROP", date(2020, 1, 1), date(2030, 1, 1));
    p.short_window = short;
    p.long_window = long;
    p
}

fn close_enough(a: f64, b: f64) -> bool {
    relative_eq!(a, b, epsilon = 1e-9, max_relative = 1e-9)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn constant_series_indicators_are_flat(price in 1.0f64..1_000.0, len in 30usize..120) {
        let bars = constant_bars("2020-01-01", len, price);
        let rows = compute_indicator_table(&bars, &IndicatorParams::with_windows(5, 20));

        for row in &rows {
            if let Some(v) = row.sma_short {
                prop_assert!(close_enough(v, price));
            }
            if let Some(v) = row.sma_long {
                prop_assert!(close_enough(v, price));
            }
            if let (Some(mid), Some(up), Some(lo)) = (row.bb_mid, row.bb_upper, row.bb_lower) {
                prop_assert!(close_enough(mid, price));
                prop_assert!((up - lo).abs() <= 1e-6 * price);
            }
            if let Some(m) = row.macd {
                prop_assert!(m.abs() <= 1e-6 * price);
            }
        }
        prop_assert!(rows[len - 1].bb_mid.is_some());

        let ema = calculate_ema(&bars, 12);
        for point in &ema.values {
            let v = point.simple();
            prop_assert!(v.is_some_and(|v| close_enough(v, price)));
        }
    }

    #[test]
    fn increasing_series_rsi_is_100(start in 1.0f64..500.0, len in 20usize..80) {
        let bars = generate_bars("2020-01-01", len, start);
        let rows = compute_indicator_table(&bars, &IndicatorParams::with_windows(5, 10));
        for row in &rows[13..] {
            prop_assert_eq!(row.rsi, Some(100.0));
        }
    }

    #[test]
    fn signals_and_transitions_are_well_formed(
        closes in prop::collection::vec(1.0f64..500.0, 1..250),
        short in 2usize..20,
        gap in 1usize..40,
    ) {
        let long = short + gap;
        let bars = bars_from_closes("2020-01-01", &closes);
        let rows = compute_indicator_table(&bars, &IndicatorParams::with_windows(short, long));
        let signals = generate_signals(&rows, short);
        let transitions = compute_transitions(&signals);

        prop_assert_eq!(signals.len(), bars.len());
        prop_assert_eq!(transitions[0], None);
        prop_assert!(signals.iter().all(|s| s.flag() <= 1));
        prop_assert!(transitions[1..].iter().all(|t| t.is_some()));

        // buys and sells alternate, starting with a buy
        let trades: Vec<Transition> = transitions
            .iter()
            .flatten()
            .copied()
            .filter(|t| t.is_trade())
            .collect();
        for (i, t) in trades.iter().enumerate() {
            let expected = if i % 2 == 0 { Transition::Buy } else { Transition::Sell };
            prop_assert_eq!(*t, expected);
        }
    }

    #[test]
    fn portfolio_moves_only_after_long_days(
        closes in prop::collection::vec(1.0f64..500.0, 2..200),
        short in 2usize..10,
        gap in 1usize..30,
    ) {
        let long = short + gap;
        let bars = bars_from_closes("2020-01-01", &closes);
        let rows = compute_indicator_table(&bars, &IndicatorParams::with_windows(short, long));
        let signals = generate_signals(&rows, short);
        let states = run_backtest(&bars, &signals, &BacktestConfig::default());

        prop_assert_eq!(states[0].portfolio_value, 10_000.0);
        for i in 1..states.len() {
            prop_assert!(states[i].portfolio_value > 0.0);
            if signals[i - 1].flag() == 0 {
                prop_assert_eq!(states[i].portfolio_value, states[i - 1].portfolio_value);
            }
        }
    }

    #[test]
    fn drawdown_is_bounded(values in prop::collection::vec(0.01f64..100_000.0, 1..200)) {
        let dd = max_drawdown(&values).unwrap();
        prop_assert!((-1.0..=0.0).contains(&dd));
    }

    #[test]
    fn trade_counts_match_transitions(
        closes in prop::collection::vec(1.0f64..500.0, 30..250),
        short in 2usize..10,
        gap in 1usize..20,
    ) {
        let series = PriceSeries::new("PROP", bars_from_closes("2020-01-01", &closes)).unwrap();
        let analysis = analyze(&series, &params_with(short, short + gap));
        let m = &analysis.metrics;

        prop_assert_eq!(m.total_trades, m.buy_count + m.sell_count);
        prop_assert!(m.buy_count == m.sell_count || m.buy_count == m.sell_count + 1);
        prop_assert_eq!(analysis.markers.len(), m.total_trades);
        let last = analysis.portfolio.last().unwrap().portfolio_value;
        prop_assert!(close_enough(m.final_value, last));
    }

    #[test]
    fn exported_table_reads_back(closes in prop::collection::vec(1.0f64..500.0, 1..60)) {
        let series = PriceSeries::new("PROP", bars_from_closes("2020-01-01", &closes)).unwrap();
        let analysis = analyze(&series, &params_with(3, 8));
        let rows = analysis.table_rows();

        let mut buf = Vec::new();
        write_table(&mut buf, &rows).unwrap();
        let back = read_table(buf.as_slice()).unwrap();
        prop_assert_eq!(back, rows);
    }
}
