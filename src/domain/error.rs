//! Domain error types.

/// Top-level error type for stockdash.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to fetch data for {ticker}: {reason}")]
    DataFetch { ticker: String, reason: String },

    #[error("no price data for {ticker} between {start} and {end}")]
    NoData {
        ticker: String,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("invalid price series for {ticker}: {reason}")]
    InvalidSeries { ticker: String, reason: String },

    #[error("earnings data unavailable for {ticker}: {reason}")]
    EarningsUnavailable { ticker: String, reason: String },

    #[error("export error: {reason}")]
    Export { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    pub fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        DashboardError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Export {
            reason: err.to_string(),
        }
    }
}

impl DashboardError {
    /// Process exit status for this error category.
    pub fn exit_status(&self) -> u8 {
        match self {
            DashboardError::Io(_) | DashboardError::Report { .. } | DashboardError::Export { .. } => 1,
            DashboardError::ConfigParse { .. } | DashboardError::ConfigInvalid { .. } => 2,
            DashboardError::DataFetch { .. } | DashboardError::EarningsUnavailable { .. } => 3,
            DashboardError::NoData { .. } | DashboardError::InvalidSeries { .. } => 5,
        }
    }
}

impl From<&DashboardError> for std::process::ExitCode {
    fn from(err: &DashboardError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn config_invalid_display() {
        let err = DashboardError::config_invalid("dashboard", "short_window", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [dashboard] short_window: must be positive"
        );
    }

    #[test]
    fn no_data_display() {
        let err = DashboardError::NoData {
            ticker: "AAPL".into(),
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "no price data for AAPL between 2022-01-01 and 2023-01-01"
        );
    }

    #[test]
    fn exit_codes_by_category() {
        let config = DashboardError::config_invalid("dashboard", "ticker", "must not be empty");
        assert_eq!(config.exit_status(), 2);

        let fetch = DashboardError::DataFetch {
            ticker: "AAPL".into(),
            reason: "timeout".into(),
        };
        assert_eq!(fetch.exit_status(), 3);

        let series = DashboardError::InvalidSeries {
            ticker: "AAPL".into(),
            reason: "duplicate date".into(),
        };
        assert_eq!(series.exit_status(), 5);
    }
}
