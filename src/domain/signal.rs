//! SMA crossover signal and its day-over-day transitions.
//!
//! The signal is three-valued internally: `Undefined` marks the warmup region
//! (index < short_window, or either SMA not yet defined) and is kept distinct
//! from an explicit `Flat` until [`SignalState::flag`] collapses both to 0.

use crate::domain::indicator_table::IndicatorRow;
use crate::domain::ohlcv::PriceBar;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Undefined,
    Long,
    Flat,
}

impl SignalState {
    /// Presentation value: 1 when long, 0 otherwise.
    pub fn flag(self) -> u8 {
        match self {
            SignalState::Long => 1,
            SignalState::Flat | SignalState::Undefined => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Buy,
    Sell,
    Hold,
}

impl Transition {
    /// +1 buy, -1 sell, 0 hold.
    pub fn delta(self) -> i8 {
        match self {
            Transition::Buy => 1,
            Transition::Sell => -1,
            Transition::Hold => 0,
        }
    }

    pub fn from_delta(delta: i8) -> Option<Self> {
        match delta {
            1 => Some(Transition::Buy),
            -1 => Some(Transition::Sell),
            0 => Some(Transition::Hold),
            _ => None,
        }
    }

    pub fn is_trade(self) -> bool {
        self != Transition::Hold
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Buy => write!(f, "BUY"),
            Transition::Sell => write!(f, "SELL"),
            Transition::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeMarker {
    pub date: NaiveDate,
    pub price: f64,
    pub kind: Transition,
}

pub fn generate_signals(rows: &[IndicatorRow], short_window: usize) -> Vec<SignalState> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if i < short_window {
                return SignalState::Undefined;
            }
            match (row.sma_short, row.sma_long) {
                (Some(short), Some(long)) if short > long => SignalState::Long,
                (Some(_), Some(_)) => SignalState::Flat,
                _ => SignalState::Undefined,
            }
        })
        .collect()
}

/// One-step difference of the collapsed signal. Index 0 has no prior day.
pub fn compute_transitions(signals: &[SignalState]) -> Vec<Option<Transition>> {
    let mut out = Vec::with_capacity(signals.len());
    for i in 0..signals.len() {
        if i == 0 {
            out.push(None);
            continue;
        }
        let delta = signals[i].flag() as i8 - signals[i - 1].flag() as i8;
        out.push(Transition::from_delta(delta));
    }
    out
}

pub fn trade_markers(bars: &[PriceBar], transitions: &[Option<Transition>]) -> Vec<TradeMarker> {
    bars.iter()
        .zip(transitions)
        .filter_map(|(bar, t)| match t {
            Some(kind) if kind.is_trade() => Some(TradeMarker {
                date: bar.date,
                price: bar.close,
                kind: *kind,
            }),
            _ => None,
        })
        .collect()
}
