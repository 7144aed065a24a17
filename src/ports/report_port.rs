//! Report generation port trait.

use crate::domain::analysis::Analysis;
use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use chrono::NaiveDate;
use std::path::Path;

/// Everything a rendered dashboard shows for one run.
pub struct DashboardReport<'a> {
    pub analysis: &'a Analysis,
    pub earnings: Option<&'a EarningsCalendar>,
    pub export_file: Option<String>,
    /// Earnings dates before this day are left out.
    pub today: NaiveDate,
}

/// Port for writing dashboard reports.
pub trait ReportPort {
    fn write(&self, report: &DashboardReport<'_>, output_path: &Path) -> Result<(), DashboardError>;
}
