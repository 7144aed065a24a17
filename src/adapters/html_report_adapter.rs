//! HTML dashboard adapter implementing ReportPort.
//!
//! Renders `templates/dashboard.html` with Askama; charts are inline SVG and
//! every number is formatted before it reaches the template.

use std::fs;
use std::path::Path;

use crate::adapters::chart_svg::{generate_equity_svg, generate_price_svg};
use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::metrics::Metrics;
use crate::ports::report_port::{DashboardReport, ReportPort};

use askama::Template;
use chrono::NaiveDate;

struct Line {
    label: String,
    value: String,
}

impl Line {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    ticker: String,
    start_date: String,
    end_date: String,
    short_window: usize,
    long_window: usize,
    initial_cash: String,
    bar_count: usize,
    notice: Option<String>,
    price_svg: String,
    equity_svg: String,
    headline: Vec<Line>,
    details: Vec<Line>,
    earnings: Vec<Line>,
    export_file: Option<String>,
}

pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn format_optional_percent(value: Option<f64>) -> String {
    value.map(format_percent).unwrap_or_else(|| "-".to_string())
}

pub fn format_money(value: f64) -> String {
    format!("${:.2}", value)
}

fn format_large(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{:.0}", value)
    }
}

/// The three headline numbers shown first on the dashboard.
fn headline_lines(metrics: &Metrics) -> Vec<Line> {
    vec![
        Line::new("Cumulative Return", format_percent(metrics.cumulative_return)),
        Line::new("Max Drawdown", format_optional_percent(metrics.max_drawdown)),
        Line::new("Total Trades", metrics.total_trades.to_string()),
    ]
}

fn detail_lines(metrics: &Metrics) -> Vec<Line> {
    vec![
        Line::new("Final Portfolio Value", format_money(metrics.final_value)),
        Line::new(
            "Buy & Hold Return",
            format_optional_percent(metrics.buy_and_hold_return),
        ),
        Line::new(
            "Strategy Max Drawdown",
            format_optional_percent(metrics.strategy_max_drawdown),
        ),
        Line::new("Buys", metrics.buy_count.to_string()),
        Line::new("Sells", metrics.sell_count.to_string()),
    ]
}

fn earnings_lines(calendar: Option<&EarningsCalendar>, today: NaiveDate) -> Vec<Line> {
    let Some(cal) = calendar.filter(|c| !c.is_empty()) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let upcoming = cal.upcoming(today);
    if !upcoming.is_empty() {
        let dates: Vec<String> = upcoming.iter().map(|d| d.to_string()).collect();
        lines.push(Line::new("Earnings Date", dates.join(", ")));
    }
    let estimates = [
        ("EPS Estimate (avg)", cal.eps_average),
        ("EPS Estimate (low)", cal.eps_low),
        ("EPS Estimate (high)", cal.eps_high),
    ];
    for (label, value) in estimates {
        if let Some(v) = value {
            lines.push(Line::new(label, format!("{:.2}", v)));
        }
    }
    if let Some(v) = cal.revenue_average {
        lines.push(Line::new("Revenue Estimate (avg)", format_large(v)));
    }
    lines
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, report: &DashboardReport<'_>) -> Result<String, DashboardError> {
        let analysis = report.analysis;
        let params = &analysis.params;

        let template = DashboardTemplate {
            ticker: params.ticker.clone(),
            start_date: params.start_date.to_string(),
            end_date: params.end_date.to_string(),
            short_window: params.short_window,
            long_window: params.long_window,
            initial_cash: format_money(params.initial_cash),
            bar_count: analysis.series.len(),
            notice: analysis.status.notice(),
            price_svg: generate_price_svg(analysis),
            equity_svg: generate_equity_svg(&analysis.portfolio),
            headline: headline_lines(&analysis.metrics),
            details: detail_lines(&analysis.metrics),
            earnings: earnings_lines(report.earnings, report.today),
            export_file: report.export_file.clone(),
        };

        template.render().map_err(|e| DashboardError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &DashboardReport<'_>, output_path: &Path) -> Result<(), DashboardError> {
        let html = self.render(report)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, html)?;
        tracing::info!(path = %output_path.display(), "dashboard written");

        Ok(())
    }
}
