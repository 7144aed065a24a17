//! Core domain types and logic.

pub mod analysis;
pub mod backtest;
pub mod config_validation;
pub mod earnings;
pub mod error;
pub mod indicator;
pub mod indicator_table;
pub mod metrics;
pub mod ohlcv;
pub mod signal;
