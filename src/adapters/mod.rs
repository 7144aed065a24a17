//! Concrete adapter implementations for ports.

pub mod cached_data_adapter;
pub mod chart_svg;
pub mod csv_adapter;
pub mod csv_export;
pub mod file_config_adapter;
pub mod html_report_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
