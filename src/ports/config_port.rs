//! Configuration access port trait.
//!
//! Only `get_string` is required. The typed getters fall back to their
//! default when a key is absent and fail with `ConfigInvalid` when it is
//! present but malformed.

use crate::domain::error::DashboardError;
use chrono::NaiveDate;

/// Boolean spellings accepted in config files.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, DashboardError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                DashboardError::config_invalid(
                    section,
                    key,
                    format!("expected a non-negative integer, got '{}'", raw.trim()),
                )
            }),
        }
    }

    fn get_f64(&self, section: &str, key: &str, default: f64) -> Result<f64, DashboardError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                DashboardError::config_invalid(
                    section,
                    key,
                    format!("expected a number, got '{}'", raw.trim()),
                )
            }),
        }
    }

    fn get_flag(&self, section: &str, key: &str, default: bool) -> Result<bool, DashboardError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                DashboardError::config_invalid(
                    section,
                    key,
                    format!("expected true or false, got '{}'", raw.trim()),
                )
            }),
        }
    }

    /// Date in `YYYY-MM-DD` form; `None` when the key is absent.
    fn get_date(&self, section: &str, key: &str) -> Result<Option<NaiveDate>, DashboardError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    DashboardError::config_invalid(
                        section,
                        key,
                        format!("invalid {} format, expected YYYY-MM-DD", key),
                    )
                }),
        }
    }
}
