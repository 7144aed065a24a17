//! Yahoo Finance data adapter.
//!
//! Daily bars come from the v8 chart API, the earnings calendar from the
//! quoteSummary `calendarEvents` module. One blocking request per call, no
//! retry: a failure surfaces to the caller as an error.

use crate::domain::earnings::EarningsCalendar;
use crate::domain::error::DashboardError;
use crate::domain::ohlcv::{normalize_bars, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query2.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<SummaryData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryData {
    calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, Deserialize)]
struct CalendarEvents {
    earnings: Option<EarningsEvents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsEvents {
    #[serde(default)]
    earnings_date: Vec<RawValue>,
    earnings_average: Option<RawValue>,
    earnings_low: Option<RawValue>,
    earnings_high: Option<RawValue>,
    revenue_average: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, DashboardError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, DashboardError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DashboardError::DataFetch {
                ticker: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive; stretch to the end of the last requested day
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp() + 86_399;
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            self.base_url, ticker, start_ts, end_ts
        )
    }

    fn summary_url(&self, ticker: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{}?modules=calendarEvents",
            self.base_url, ticker
        )
    }

    fn get_text(&self, ticker: &str, url: &str) -> Result<String, reqwest::Error> {
        tracing::debug!(%ticker, %url, "yahoo request");
        self.client.get(url).send()?.error_for_status()?.text()
    }
}

fn parse_chart(ticker: &str, body: &str) -> Result<Vec<PriceBar>, DashboardError> {
    let fetch_err = |reason: String| DashboardError::DataFetch {
        ticker: ticker.to_string(),
        reason,
    };

    let resp: ChartResponse =
        serde_json::from_str(body).map_err(|e| fetch_err(format!("unexpected response: {}", e)))?;

    if let Some(err) = resp.chart.error {
        return Err(fetch_err(format!("{}: {}", err.code, err.description)));
    }

    let Some(data) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let timestamps = data.timestamp.unwrap_or_default();
    let Some(quote) = data.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| fetch_err(format!("invalid timestamp: {}", ts)))?;

        let field = |v: &[Option<f64>]| v.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            continue;
        };

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    Ok(normalize_bars(bars))
}

fn parse_calendar(ticker: &str, body: &str) -> Result<EarningsCalendar, DashboardError> {
    let unavailable = |reason: String| DashboardError::EarningsUnavailable {
        ticker: ticker.to_string(),
        reason,
    };

    let resp: SummaryResponse = serde_json::from_str(body)
        .map_err(|e| unavailable(format!("unexpected response: {}", e)))?;

    if let Some(err) = resp.quote_summary.error {
        return Err(unavailable(format!("{}: {}", err.code, err.description)));
    }

    let earnings = resp
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|d| d.calendar_events)
        .and_then(|c| c.earnings)
        .ok_or_else(|| unavailable("no calendar events".to_string()))?;

    let raw = |v: &Option<RawValue>| v.as_ref().and_then(|r| r.raw);
    let earnings_dates = earnings
        .earnings_date
        .iter()
        .filter_map(|v| v.raw)
        .filter_map(|ts| DateTime::from_timestamp(ts as i64, 0))
        .map(|dt| dt.date_naive())
        .collect();

    Ok(EarningsCalendar {
        ticker: ticker.to_string(),
        earnings_dates,
        eps_average: raw(&earnings.earnings_average),
        eps_low: raw(&earnings.earnings_low),
        eps_high: raw(&earnings.earnings_high),
        revenue_average: raw(&earnings.revenue_average),
    })
}

impl DataPort for YahooAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, DashboardError> {
        let url = self.chart_url(ticker, start_date, end_date);
        let body = self
            .get_text(ticker, &url)
            .map_err(|e| DashboardError::DataFetch {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;
        let bars = parse_chart(ticker, &body)?;
        Ok(bars
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect())
    }

    fn fetch_earnings(&self, ticker: &str) -> Result<EarningsCalendar, DashboardError> {
        let url = self.summary_url(ticker);
        let body = self
            .get_text(ticker, &url)
            .map_err(|e| DashboardError::EarningsUnavailable {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;
        parse_calendar(ticker, &body)
    }
}
