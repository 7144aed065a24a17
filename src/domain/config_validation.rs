//! Configuration validation.
//!
//! Turns the merged `[dashboard]`, `[data]` and `[report]` sections into typed
//! settings, rejecting anything the pipeline cannot run with.

use crate::domain::analysis::{AnalysisParams, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::backtest::DEFAULT_INITIAL_CASH;
use crate::domain::error::DashboardError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_START_DATE: &str = "2022-01-01";
pub const DEFAULT_END_DATE: &str = "2023-01-01";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT: &str = "dashboard.html";

/// Recommended slider ranges; values outside only warn.
pub const SHORT_WINDOW_RANGE: (usize, usize) = (10, 100);
pub const LONG_WINDOW_RANGE: (usize, usize) = (20, 300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
}

impl FromStr for DataSource {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            other => Err(DashboardError::config_invalid(
                "data",
                "source",
                format!("unknown data source '{}', expected yahoo or csv", other),
            )),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Yahoo => write!(f, "yahoo"),
            DataSource::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub source: DataSource,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub output: PathBuf,
    /// `None` means the default `{TICKER}_strategy.csv`.
    pub export: Option<PathBuf>,
    pub earnings: bool,
}

pub fn build_analysis_params(config: &dyn ConfigPort) -> Result<AnalysisParams, DashboardError> {
    let ticker = config
        .get_string("dashboard", "ticker")
        .unwrap_or_else(|| DEFAULT_TICKER.to_string());

    let start_date = match config.get_date("dashboard", "start_date")? {
        Some(d) => d,
        None => default_date(DEFAULT_START_DATE, "start_date")?,
    };
    let end_date = match config.get_date("dashboard", "end_date")? {
        Some(d) => d,
        None => default_date(DEFAULT_END_DATE, "end_date")?,
    };

    let mut params = AnalysisParams::new(&ticker, start_date, end_date);
    params.short_window = config.get_usize("dashboard", "short_window", DEFAULT_SHORT_WINDOW)?;
    params.long_window = config.get_usize("dashboard", "long_window", DEFAULT_LONG_WINDOW)?;
    params.initial_cash = config.get_f64("dashboard", "initial_cash", DEFAULT_INITIAL_CASH)?;

    validate_params(&params)?;
    Ok(params)
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, DashboardError> {
    let source = match config.get_string("data", "source") {
        Some(s) => s.parse()?,
        None => DataSource::Yahoo,
    };
    let data_dir = config
        .get_string("data", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    Ok(DataSettings {
        source,
        data_dir: PathBuf::from(data_dir),
    })
}

pub fn build_report_settings(config: &dyn ConfigPort) -> Result<ReportSettings, DashboardError> {
    let output = config
        .get_string("report", "output")
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if output.trim().is_empty() {
        return Err(DashboardError::config_invalid(
            "report",
            "output",
            "output path must not be empty",
        ));
    }

    Ok(ReportSettings {
        output: PathBuf::from(output),
        export: config
            .get_string("report", "export")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from),
        earnings: config.get_flag("report", "earnings", true)?,
    })
}

/// Checks applied to every run, including interactive parameter changes.
pub fn validate_params(params: &AnalysisParams) -> Result<(), DashboardError> {
    validate_ticker(&params.ticker)?;
    validate_dates(params.start_date, params.end_date)?;
    validate_windows(params.short_window, params.long_window)?;
    validate_initial_cash(params.initial_cash)?;
    Ok(())
}

fn validate_ticker(ticker: &str) -> Result<(), DashboardError> {
    if ticker.trim().is_empty() {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "ticker",
            "ticker must not be empty",
        ));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "ticker",
            format!("'{}' is not a valid ticker symbol", ticker),
        ));
    }
    Ok(())
}

fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), DashboardError> {
    if start >= end {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

fn validate_windows(short: usize, long: usize) -> Result<(), DashboardError> {
    if short == 0 {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if long == 0 {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "long_window",
            "long_window must be at least 1",
        ));
    }
    if short >= long {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "short_window",
            format!(
                "short_window ({}) must be less than long_window ({})",
                short, long
            ),
        ));
    }

    if short < SHORT_WINDOW_RANGE.0 || short > SHORT_WINDOW_RANGE.1 {
        tracing::warn!(
            short_window = short,
            "short_window outside the recommended range {}-{}",
            SHORT_WINDOW_RANGE.0,
            SHORT_WINDOW_RANGE.1
        );
    }
    if long < LONG_WINDOW_RANGE.0 || long > LONG_WINDOW_RANGE.1 {
        tracing::warn!(
            long_window = long,
            "long_window outside the recommended range {}-{}",
            LONG_WINDOW_RANGE.0,
            LONG_WINDOW_RANGE.1
        );
    }
    Ok(())
}

fn validate_initial_cash(cash: f64) -> Result<(), DashboardError> {
    if !cash.is_finite() || cash <= 0.0 {
        return Err(DashboardError::config_invalid(
            "dashboard",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn default_date(value: &str, key: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| DashboardError::config_invalid("dashboard", key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn full_config_builds_params() {
        let config = make_config(
            r#"
[dashboard]
ticker = msft
start_date = 2020-01-01
end_date = 2024-12-31
short_window = 20
long_window = 100
initial_cash = 5000
"#,
        );
        let params = build_analysis_params(&config).unwrap();
        assert_eq!(params.ticker, "MSFT");
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(params.end_date, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!((params.short_window, params.long_window), (20, 100));
        assert_eq!(params.initial_cash, 5000.0);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let params = build_analysis_params(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(params.ticker, "AAPL");
        assert_eq!(params.start_date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(params.end_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!((params.short_window, params.long_window), (50, 200));
        assert_eq!(params.initial_cash, 10_000.0);
    }

    #[test]
    fn short_not_below_long_fails() {
        let config = make_config("[dashboard]\nshort_window = 100\nlong_window = 100\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "short_window"));
    }

    #[test]
    fn zero_windows_fail() {
        let config = make_config("[dashboard]\nshort_window = 0\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "short_window"));

        let config = make_config("[dashboard]\nshort_window = 5\nlong_window = 0\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "long_window"));
    }

    #[test]
    fn out_of_range_windows_only_warn() {
        let config = make_config("[dashboard]\nshort_window = 5\nlong_window = 400\n");
        let params = build_analysis_params(&config).unwrap();
        assert_eq!((params.short_window, params.long_window), (5, 400));
    }

    #[test]
    fn start_after_end_fails() {
        let config = make_config("[dashboard]\nstart_date = 2024-12-31\nend_date = 2020-01-01\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn invalid_date_format_fails() {
        let config = make_config("[dashboard]\nstart_date = 01/02/2020\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "start_date"));
    }

    #[test]
    fn blank_ticker_fails() {
        let config = make_config("[dashboard]\nticker = $$$\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "ticker"));
    }

    #[test]
    fn non_positive_cash_fails() {
        let config = make_config("[dashboard]\ninitial_cash = 0\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn malformed_cash_fails() {
        let config = make_config("[dashboard]\ninitial_cash = ten thousand\n");
        let err = build_analysis_params(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "initial_cash"));
    }

    #[test]
    fn malformed_earnings_flag_fails() {
        let config = make_config("[report]\nearnings = nope\n");
        let err = build_report_settings(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "earnings"));
    }

    #[test]
    fn data_settings_parse_source() {
        let config = make_config("[data]\nsource = CSV\ndata_dir = /tmp/prices\n");
        let settings = build_data_settings(&config).unwrap();
        assert_eq!(settings.source, DataSource::Csv);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/prices"));

        let defaults = build_data_settings(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(defaults.source, DataSource::Yahoo);
        assert_eq!(defaults.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn unknown_source_fails() {
        let config = make_config("[data]\nsource = bloomberg\n");
        let err = build_data_settings(&config).unwrap_err();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "source"));
    }

    #[test]
    fn report_settings_defaults() {
        let settings = build_report_settings(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(settings.output, PathBuf::from("dashboard.html"));
        assert_eq!(settings.export, None);
        assert!(settings.earnings);
    }

    #[test]
    fn report_settings_from_file() {
        let config = make_config("[report]\noutput = out/a.html\nexport = out/a.csv\nearnings = no\n");
        let settings = build_report_settings(&config).unwrap();
        assert_eq!(settings.output, PathBuf::from("out/a.html"));
        assert_eq!(settings.export, Some(PathBuf::from("out/a.csv")));
        assert!(!settings.earnings);
    }
}
