//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::cached_data_adapter::CachedDataPort;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::{export_analysis, export_file_name};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::{
    format_money, format_optional_percent, format_percent, HtmlReportAdapter,
};
use crate::domain::analysis::{analyze, Analysis, AnalysisParams, AnalysisStatus};
use crate::domain::config_validation::{
    build_analysis_params, build_data_settings, build_report_settings, DataSettings, DataSource,
    ReportSettings,
};
use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::{DashboardReport, ReportPort};
use crate::session;

#[derive(Parser, Debug)]
#[command(name = "stockdash", about = "Moving-average crossover strategy dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch prices, run the strategy and write the dashboard
    Analyze(RunArgs),
    /// Show the upcoming earnings calendar for a ticker
    Earnings {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a dashboard configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Adjust parameters at a prompt and rerun on every change
    Interactive(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub ticker: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub short: Option<usize>,
    #[arg(long)]
    pub long: Option<usize>,
    #[arg(long)]
    pub cash: Option<f64>,
    /// yahoo or csv
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub export: Option<PathBuf>,
    #[arg(long)]
    pub no_earnings: bool,
}

/// Fully validated inputs of one dashboard run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub params: AnalysisParams,
    pub data: DataSettings,
    pub report: ReportSettings,
}

impl RunSettings {
    pub fn export_path(&self) -> PathBuf {
        self.report
            .export
            .clone()
            .unwrap_or_else(|| PathBuf::from(export_file_name(&self.params.ticker)))
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Earnings {
            ticker,
            config,
            source,
            data_dir,
        } => {
            let args = RunArgs {
                config,
                ticker,
                source,
                data_dir,
                ..RunArgs::default()
            };
            run_earnings(&args)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Interactive(args) => run_interactive(&args),
    }
}

/// Config file (or an empty one) with the command-line flags layered on top.
pub fn build_config(args: &RunArgs) -> Result<FileConfigAdapter, DashboardError> {
    let mut config = match &args.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path)?
        }
        None => FileConfigAdapter::empty(),
    };

    config.set_opt("dashboard", "ticker", args.ticker.as_deref());
    config.set_opt("dashboard", "start_date", args.start);
    config.set_opt("dashboard", "end_date", args.end);
    config.set_opt("dashboard", "short_window", args.short);
    config.set_opt("dashboard", "long_window", args.long);
    config.set_opt("dashboard", "initial_cash", args.cash);
    config.set_opt("data", "source", args.source.as_deref());
    config.set_opt(
        "data",
        "data_dir",
        args.data_dir.as_ref().map(|p| p.display()),
    );
    config.set_opt("report", "output", args.output.as_ref().map(|p| p.display()));
    config.set_opt("report", "export", args.export.as_ref().map(|p| p.display()));
    if args.no_earnings {
        config.set("report", "earnings", "false");
    }
    Ok(config)
}

pub fn resolve_settings(args: &RunArgs) -> Result<RunSettings, DashboardError> {
    let config = build_config(args)?;
    Ok(RunSettings {
        params: build_analysis_params(&config)?,
        data: build_data_settings(&config)?,
        report: build_report_settings(&config)?,
    })
}

pub fn make_data_port(settings: &DataSettings) -> Result<Box<dyn DataPort>, DashboardError> {
    match settings.source {
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(settings.data_dir.clone()))),
        #[cfg(feature = "yahoo")]
        DataSource::Yahoo => Ok(Box::new(
            crate::adapters::yahoo_adapter::YahooAdapter::new()?,
        )),
        #[cfg(not(feature = "yahoo"))]
        DataSource::Yahoo => Err(DashboardError::config_invalid(
            "data",
            "source",
            "built without the yahoo feature; use source = csv",
        )),
    }
}

/// Fetches the price series for `params`, normalizing provider output.
pub fn load_series(
    port: &dyn DataPort,
    params: &AnalysisParams,
) -> Result<PriceSeries, DashboardError> {
    tracing::info!(
        ticker = %params.ticker,
        start = %params.start_date,
        end = %params.end_date,
        "fetching price history"
    );
    let bars = port.fetch_history(&params.ticker, params.start_date, params.end_date)?;
    PriceSeries::new(params.ticker.as_str(), bars)
}

fn load_earnings(port: &dyn DataPort, ticker: &str) -> Option<EarningsCalendar> {
    match port.fetch_earnings(ticker) {
        Ok(calendar) => Some(calendar),
        Err(e) => {
            tracing::warn!(%ticker, error = %e, "earnings lookup failed");
            None
        }
    }
}

/// Runs the whole pipeline once and writes the dashboard and export.
///
/// The report is written even when the fetch or the export fails; the
/// error is returned once the report is on disk.
pub fn run_dashboard(
    port: &dyn DataPort,
    settings: &RunSettings,
) -> Result<Analysis, DashboardError> {
    let params = &settings.params;

    let (series, fetch_error) = match load_series(port, params) {
        Ok(series) => (series, None),
        Err(e) => {
            tracing::warn!(ticker = %params.ticker, error = %e, "price fetch failed");
            (PriceSeries::empty(params.ticker.as_str()), Some(e))
        }
    };

    let analysis = analyze(&series, params);

    let mut export_error = None;
    let export_file = if analysis.series.is_empty() {
        None
    } else {
        let path = settings.export_path();
        match export_analysis(&analysis, &path) {
            Ok(()) => Some(display_name(&path)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "export failed");
                export_error = Some(e);
                None
            }
        }
    };

    let earnings = if settings.report.earnings && fetch_error.is_none() {
        load_earnings(port, &params.ticker)
    } else {
        None
    };

    let report = DashboardReport {
        analysis: &analysis,
        earnings: earnings.as_ref(),
        export_file,
        today: chrono::Local::now().date_naive(),
    };
    HtmlReportAdapter::new().write(&report, &settings.report.output)?;

    if let Some(e) = fetch_error.or(export_error) {
        return Err(e);
    }
    if analysis.status == AnalysisStatus::Empty {
        return Err(DashboardError::NoData {
            ticker: params.ticker.clone(),
            start: params.start_date,
            end: params.end_date,
        });
    }
    Ok(analysis)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Console metrics block shared by `analyze` and the interactive session.
pub fn format_summary(analysis: &Analysis) -> String {
    let p = &analysis.params;
    let m = &analysis.metrics;
    let mut out = String::new();

    out.push_str(&format!(
        "\n=== {} {} to {} (SMA {}/{}) ===\n",
        p.ticker, p.start_date, p.end_date, p.short_window, p.long_window
    ));
    if let Some(notice) = analysis.status.notice() {
        out.push_str(&format!("note: {}\n", notice));
    }
    out.push_str(&format!("Bars:              {}\n", analysis.series.len()));
    out.push_str(&format!("Cumulative Return: {}\n", format_percent(m.cumulative_return)));
    out.push_str(&format!("Max Drawdown:      {}\n", format_optional_percent(m.max_drawdown)));
    out.push_str(&format!("Total Trades:      {}\n", m.total_trades));
    out.push_str(&format!(
        "  buys / sells:    {} / {}\n",
        m.buy_count, m.sell_count
    ));
    out.push_str(&format!(
        "Buy & Hold:        {}\n",
        format_optional_percent(m.buy_and_hold_return)
    ));
    out.push_str(&format!(
        "Strategy Drawdown: {}\n",
        format_optional_percent(m.strategy_max_drawdown)
    ));
    out.push_str(&format!("Final Value:       {}\n", format_money(m.final_value)));
    out
}

fn run_analyze(args: &RunArgs) -> ExitCode {
    let settings = match resolve_settings(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let port = match make_data_port(&settings.data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Analyzing {} from {} to {} ({} data)",
        settings.params.ticker,
        settings.params.start_date,
        settings.params.end_date,
        settings.data.source
    );

    match run_dashboard(port.as_ref(), &settings) {
        Ok(analysis) => {
            eprint!("{}", format_summary(&analysis));
            if !analysis.series.is_empty() {
                eprintln!("\nData exported to: {}", settings.export_path().display());
            }
            eprintln!("Dashboard written to: {}", settings.report.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Dashboard written to: {}", settings.report.output.display());
            (&e).into()
        }
    }
}

fn run_earnings(args: &RunArgs) -> ExitCode {
    let settings = match resolve_settings(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let port = match make_data_port(&settings.data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let ticker = &settings.params.ticker;
    match port.fetch_earnings(ticker) {
        Ok(calendar) if !calendar.is_empty() => {
            let today = chrono::Local::now().date_naive();
            let upcoming = calendar.upcoming(today);
            eprintln!("Upcoming earnings for {}:", ticker);
            if upcoming.is_empty() {
                println!("Earnings Date: none scheduled after {}", today);
            }
            for date in &upcoming {
                println!("Earnings Date: {}", date);
            }
            if let Some(v) = calendar.eps_average {
                println!("EPS Estimate (avg): {:.2}", v);
            }
            if let (Some(lo), Some(hi)) = (calendar.eps_low, calendar.eps_high) {
                println!("EPS Estimate range: {:.2} - {:.2}", lo, hi);
            }
            if let Some(v) = calendar.revenue_average {
                println!("Revenue Estimate (avg): {:.0}", v);
            }
            ExitCode::SUCCESS
        }
        Ok(_) => {
            eprintln!("No earnings data available.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::warn!(%ticker, error = %e, "earnings lookup failed");
            eprintln!("No earnings data available.");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let args = RunArgs {
        config: Some(config_path.to_path_buf()),
        ..RunArgs::default()
    };
    let settings = match resolve_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let p = &settings.params;
    eprintln!("Config validated successfully");
    eprintln!("\nDashboard:");
    eprintln!("  ticker:        {}", p.ticker);
    eprintln!("  range:         {} to {}", p.start_date, p.end_date);
    eprintln!("  windows:       SMA {} / SMA {}", p.short_window, p.long_window);
    eprintln!("  initial cash:  {}", format_money(p.initial_cash));
    eprintln!("\nData:");
    eprintln!("  source:        {}", settings.data.source);
    if settings.data.source == DataSource::Csv {
        eprintln!("  data dir:      {}", settings.data.data_dir.display());
    }
    eprintln!("\nReport:");
    eprintln!("  output:        {}", settings.report.output.display());
    eprintln!("  export:        {}", settings.export_path().display());
    eprintln!("  earnings:      {}", settings.report.earnings);
    ExitCode::SUCCESS
}

fn run_interactive(args: &RunArgs) -> ExitCode {
    let settings = match resolve_settings(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let port = match make_data_port(&settings.data) {
        Ok(p) => CachedDataPort::new(p),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match session::run_session(stdin.lock(), &mut stdout, &port, settings) {
        Ok(()) => {
            tracing::debug!(hits = port.hits(), misses = port.misses(), "session closed");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
