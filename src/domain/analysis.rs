//! End-to-end strategy analysis of one price series.
//!
//! Every derived series is recomputed from scratch on each call; nothing here
//! holds state between runs.

use crate::domain::backtest::{run_backtest, BacktestConfig, PortfolioState, DEFAULT_INITIAL_CASH};
use crate::domain::indicator_table::{compute_indicator_table, IndicatorParams, IndicatorRow};
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::{
    compute_transitions, generate_signals, trade_markers, SignalState, TradeMarker, Transition,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

/// Key under which fetched price history is memoized.
pub type CacheKey = (String, NaiveDate, NaiveDate);

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_cash: f64,
}

impl AnalysisParams {
    pub fn new(ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start_date,
            end_date,
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_cash: DEFAULT_INITIAL_CASH,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        (self.ticker.clone(), self.start_date, self.end_date)
    }

    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams::with_windows(self.short_window, self.long_window)
    }

    /// Bars needed before both crossover averages exist.
    pub fn required_history(&self) -> usize {
        self.short_window.max(self.long_window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Complete,
    Empty,
    InsufficientHistory { bars: usize, required: usize },
}

impl AnalysisStatus {
    pub fn notice(&self) -> Option<String> {
        match self {
            AnalysisStatus::Complete => None,
            AnalysisStatus::Empty => Some("No price data in the selected range.".to_string()),
            AnalysisStatus::InsufficientHistory { bars, required } => Some(format!(
                "Insufficient history: {} bars loaded, {} required for the selected windows.",
                bars, required
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: PriceSeries,
    pub params: AnalysisParams,
    pub rows: Vec<IndicatorRow>,
    pub signals: Vec<SignalState>,
    pub transitions: Vec<Option<Transition>>,
    pub portfolio: Vec<PortfolioState>,
    pub markers: Vec<TradeMarker>,
    pub metrics: Metrics,
    pub status: AnalysisStatus,
}

/// One line of the exported strategy table, with signals collapsed to flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: u64,
    #[serde(rename = "SMA_short")]
    pub sma_short: Option<f64>,
    #[serde(rename = "SMA_long")]
    pub sma_long: Option<f64>,
    #[serde(rename = "RSI")]
    pub rsi: Option<f64>,
    #[serde(rename = "MACD")]
    pub macd: Option<f64>,
    #[serde(rename = "Signal_Line")]
    pub signal_line: Option<f64>,
    #[serde(rename = "BB_Mid")]
    pub bb_mid: Option<f64>,
    #[serde(rename = "BB_Upper")]
    pub bb_upper: Option<f64>,
    #[serde(rename = "BB_Lower")]
    pub bb_lower: Option<f64>,
    #[serde(rename = "Signal")]
    pub signal: u8,
    #[serde(rename = "Position")]
    pub position: Option<i8>,
    #[serde(rename = "Daily Return")]
    pub daily_return: Option<f64>,
    #[serde(rename = "Strategy Return")]
    pub strategy_return: Option<f64>,
    #[serde(rename = "Portfolio Value")]
    pub portfolio_value: f64,
}

pub fn analyze(series: &PriceSeries, params: &AnalysisParams) -> Analysis {
    let bars = series.bars();
    let required = params.required_history();

    let status = if bars.is_empty() {
        AnalysisStatus::Empty
    } else if bars.len() < required {
        AnalysisStatus::InsufficientHistory {
            bars: bars.len(),
            required,
        }
    } else {
        AnalysisStatus::Complete
    };

    let (rows, signals) = if status == AnalysisStatus::Complete {
        let rows = compute_indicator_table(bars, &params.indicator_params());
        let signals = generate_signals(&rows, params.short_window);
        (rows, signals)
    } else {
        tracing::warn!(
            ticker = %params.ticker,
            bars = bars.len(),
            required,
            "not enough history, indicators left undefined"
        );
        let rows = bars.iter().map(|b| IndicatorRow::undefined(b.date)).collect();
        (rows, vec![SignalState::Undefined; bars.len()])
    };

    let transitions = compute_transitions(&signals);
    let config = BacktestConfig {
        initial_cash: params.initial_cash,
    };
    let portfolio = run_backtest(bars, &signals, &config);
    let markers = trade_markers(bars, &transitions);

    let metrics = match status {
        AnalysisStatus::Complete => {
            Metrics::compute(bars, &transitions, &portfolio, params.initial_cash)
        }
        _ => Metrics::neutral(params.initial_cash),
    };

    tracing::info!(
        ticker = %params.ticker,
        bars = bars.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        trades = metrics.total_trades,
        "analysis complete"
    );

    Analysis {
        series: series.clone(),
        params: params.clone(),
        rows,
        signals,
        transitions,
        portfolio,
        markers,
        metrics,
        status,
    }
}

impl Analysis {
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.series
            .bars()
            .iter()
            .zip(&self.rows)
            .zip(&self.signals)
            .zip(&self.transitions)
            .zip(&self.portfolio)
            .map(|((((bar, row), signal), transition), state)| TableRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                sma_short: row.sma_short,
                sma_long: row.sma_long,
                rsi: row.rsi,
                macd: row.macd,
                signal_line: row.signal_line,
                bb_mid: row.bb_mid,
                bb_upper: row.bb_upper,
                bb_lower: row.bb_lower,
                signal: signal.flag(),
                position: transition.map(Transition::delta),
                daily_return: state.daily_return,
                strategy_return: state.strategy_return,
                portfolio_value: state.portfolio_value,
            })
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.status == AnalysisStatus::Complete
    }
}
