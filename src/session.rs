//! Line-oriented interactive session.
//!
//! Each accepted parameter change reruns the whole pipeline, the same way the
//! dashboard recomputes on every widget change. Price history goes through the
//! caller's data port, so window changes reuse the cached fetch.

use std::io::{BufRead, Write};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::cli::{format_summary, run_dashboard, RunSettings};
use crate::domain::config_validation::validate_params;
use crate::domain::error::DashboardError;
use crate::ports::data_port::DataPort;

pub const HELP: &str = "\
commands:
  ticker SYMBOL      change the ticker
  start YYYY-MM-DD   change the start date
  end YYYY-MM-DD     change the end date
  short N            change the short SMA window
  long N             change the long SMA window
  cash AMOUNT        change the initial cash
  show               print the current parameters
  run                rerun with the current parameters
  help               print this message
  quit               leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Ticker(String),
    Start(NaiveDate),
    End(NaiveDate),
    Short(usize),
    Long(usize),
    Cash(f64),
    Show,
    Run,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err("empty command".to_string());
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(format!("too many arguments for '{}'", word));
        }

        let need = |name: &str| arg.ok_or_else(|| format!("'{}' needs a value", name));
        let date = |name: &str| {
            let raw = need(name)?;
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw))
        };
        let count = |name: &str| {
            let raw = need(name)?;
            raw.parse::<usize>()
                .map_err(|_| format!("invalid window '{}'", raw))
        };

        match word.to_lowercase().as_str() {
            "ticker" => Ok(SessionCommand::Ticker(need("ticker")?.to_uppercase())),
            "start" => Ok(SessionCommand::Start(date("start")?)),
            "end" => Ok(SessionCommand::End(date("end")?)),
            "short" => Ok(SessionCommand::Short(count("short")?)),
            "long" => Ok(SessionCommand::Long(count("long")?)),
            "cash" => {
                let raw = need("cash")?;
                raw.parse::<f64>()
                    .map(SessionCommand::Cash)
                    .map_err(|_| format!("invalid amount '{}'", raw))
            }
            "show" => Ok(SessionCommand::Show),
            "run" => Ok(SessionCommand::Run),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Rerun,
    Show,
    Help,
    Quit,
}

pub struct Session {
    settings: RunSettings,
}

impl Session {
    pub fn new(settings: RunSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Applies `command`. A parameter change is validated as a whole and
    /// discarded if invalid, leaving the previous settings in place.
    pub fn apply(&mut self, command: SessionCommand) -> Result<Step, DashboardError> {
        let mut params = self.settings.params.clone();
        match command {
            SessionCommand::Ticker(t) => params.ticker = t,
            SessionCommand::Start(d) => params.start_date = d,
            SessionCommand::End(d) => params.end_date = d,
            SessionCommand::Short(n) => params.short_window = n,
            SessionCommand::Long(n) => params.long_window = n,
            SessionCommand::Cash(c) => params.initial_cash = c,
            SessionCommand::Run => return Ok(Step::Rerun),
            SessionCommand::Show => return Ok(Step::Show),
            SessionCommand::Help => return Ok(Step::Help),
            SessionCommand::Quit => return Ok(Step::Quit),
        }

        validate_params(&params)?;
        self.settings.params = params;
        Ok(Step::Rerun)
    }

    pub fn describe(&self) -> String {
        let p = &self.settings.params;
        format!(
            "ticker {} | {} to {} | SMA {}/{} | cash {:.2}",
            p.ticker, p.start_date, p.end_date, p.short_window, p.long_window, p.initial_cash
        )
    }
}

fn rerun<W: Write>(out: &mut W, port: &dyn DataPort, settings: &RunSettings) -> std::io::Result<()> {
    match run_dashboard(port, settings) {
        Ok(analysis) => write!(out, "{}", format_summary(&analysis)),
        Err(e) => writeln!(out, "error: {}", e),
    }
}

/// Reads commands from `input` until `quit` or end of input.
pub fn run_session<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    port: &dyn DataPort,
    settings: RunSettings,
) -> Result<(), DashboardError> {
    let mut session = Session::new(settings);
    writeln!(out, "{}", HELP)?;
    rerun(out, port, session.settings())?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(c) => c,
            Err(msg) => {
                writeln!(out, "error: {}", msg)?;
                continue;
            }
        };

        match session.apply(command) {
            Ok(Step::Rerun) => rerun(out, port, session.settings())?,
            Ok(Step::Show) => writeln!(out, "{}", session.describe())?,
            Ok(Step::Help) => writeln!(out, "{}", HELP)?,
            Ok(Step::Quit) => break,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        out.flush()?;
    }

    Ok(())
}
