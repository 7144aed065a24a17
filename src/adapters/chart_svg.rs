//! Inline SVG charts for the dashboard report.

use crate::domain::analysis::Analysis;
use crate::domain::backtest::PortfolioState;
use crate::domain::signal::Transition;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;

const CLOSE_COLOR: &str = "#1f77b4";
const SMA_SHORT_COLOR: &str = "#ff7f0e";
const SMA_LONG_COLOR: &str = "#9467bd";
const BAND_COLOR: &str = "#7f7f7f";
const BUY_COLOR: &str = "#2ca02c";
const SELL_COLOR: &str = "#d62728";

/// Maps series index and value onto the plot area.
struct Frame {
    min: f64,
    max: f64,
    len: usize,
    height: f64,
}

impl Frame {
    fn new(values: impl Iterator<Item = f64>, len: usize, height: f64) -> Option<Self> {
        let (min, max) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !min.is_finite() || len == 0 {
            return None;
        }
        Some(Self {
            min,
            max,
            len,
            height,
        })
    }

    fn x(&self, i: usize) -> f64 {
        if self.len > 1 {
            PADDING + i as f64 * (WIDTH - 2.0 * PADDING) / (self.len - 1) as f64
        } else {
            WIDTH / 2.0
        }
    }

    fn y(&self, v: f64) -> f64 {
        let plot = self.height - 2.0 * PADDING;
        let range = self.max - self.min;
        if range > 0.0 {
            self.height - PADDING - (v - self.min) / range * plot
        } else {
            self.height / 2.0
        }
    }

    fn axes(&self) -> String {
        let bottom = self.height - PADDING;
        format!(
            r##"<line x1="{p:.0}" y1="{p:.0}" x2="{p:.0}" y2="{b:.0}" stroke="#333"/><line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="#333"/><text x="{tx:.0}" y="{ty_max:.1}" font-size="11" text-anchor="end">{max:.2}</text><text x="{tx:.0}" y="{ty_min:.1}" font-size="11" text-anchor="end">{min:.2}</text>"##,
            p = PADDING,
            b = bottom,
            r = WIDTH - PADDING,
            tx = PADDING - 5.0,
            ty_max = self.y(self.max) + 4.0,
            ty_min = self.y(self.min) + 4.0,
            max = self.max,
            min = self.min,
        )
    }
}

/// Splits a column into runs of consecutive defined values.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn polyline(frame: &Frame, values: &[Option<f64>], color: &str, dashed: bool) -> String {
    let dash = if dashed { r#" stroke-dasharray="6,4""# } else { "" };
    segments(values)
        .iter()
        .map(|seg| {
            let points: Vec<String> = seg
                .iter()
                .map(|&(i, v)| format!("{:.1},{:.1}", frame.x(i), frame.y(v)))
                .collect();
            format!(
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
                color,
                dash,
                points.join(" ")
            )
        })
        .collect()
}

fn band(frame: &Frame, upper: &[Option<f64>], lower: &[Option<f64>]) -> String {
    let paired: Vec<Option<f64>> = upper
        .iter()
        .zip(lower)
        .map(|(u, l)| match (u, l) {
            (Some(u), Some(_)) => Some(*u),
            _ => None,
        })
        .collect();

    segments(&paired)
        .iter()
        .map(|seg| {
            let mut points: Vec<String> = seg
                .iter()
                .map(|&(i, u)| format!("{:.1},{:.1}", frame.x(i), frame.y(u)))
                .collect();
            points.extend(seg.iter().rev().filter_map(|&(i, _)| {
                lower[i].map(|l| format!("{:.1},{:.1}", frame.x(i), frame.y(l)))
            }));
            format!(
                r#"<polygon fill="{}" fill-opacity="0.15" stroke="none" points="{}"/>"#,
                BAND_COLOR,
                points.join(" ")
            )
        })
        .collect()
}

fn legend(entries: &[(&str, &str)]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(n, (label, color))| {
            let x = PADDING + 10.0 + n as f64 * 140.0;
            format!(
                r#"<rect x="{:.0}" y="12" width="14" height="4" fill="{}"/><text x="{:.0}" y="18" font-size="12">{}</text>"#,
                x,
                color,
                x + 20.0,
                escape_xml(label)
            )
        })
        .collect()
}

pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Close price with both SMAs, the Bollinger band and trade markers.
pub fn generate_price_svg(analysis: &Analysis) -> String {
    let bars = analysis.series.bars();
    let rows = &analysis.rows;

    let all_values = bars.iter().map(|b| b.close).chain(rows.iter().flat_map(|r| {
        [r.sma_short, r.sma_long, r.bb_upper, r.bb_lower]
            .into_iter()
            .flatten()
    }));
    let Some(frame) = Frame::new(all_values, bars.len(), HEIGHT) else {
        return "No price data available.".to_string();
    };

    let close: Vec<Option<f64>> = bars.iter().map(|b| Some(b.close)).collect();
    let sma_short: Vec<Option<f64>> = rows.iter().map(|r| r.sma_short).collect();
    let sma_long: Vec<Option<f64>> = rows.iter().map(|r| r.sma_long).collect();
    let upper: Vec<Option<f64>> = rows.iter().map(|r| r.bb_upper).collect();
    let lower: Vec<Option<f64>> = rows.iter().map(|r| r.bb_lower).collect();

    let index_of = |date: chrono::NaiveDate| bars.iter().position(|b| b.date == date);
    let markers: String = analysis
        .markers
        .iter()
        .filter_map(|m| {
            let i = index_of(m.date)?;
            let (glyph, color, dy) = match m.kind {
                Transition::Buy => ("\u{25B2}", BUY_COLOR, 14.0),
                Transition::Sell => ("\u{25BC}", SELL_COLOR, -6.0),
                Transition::Hold => return None,
            };
            Some(format!(
                r#"<text x="{:.1}" y="{:.1}" font-size="14" text-anchor="middle" fill="{}"><title>{} {} @ {:.2}</title>{}</text>"#,
                frame.x(i),
                frame.y(m.price) + dy,
                color,
                m.kind,
                m.date,
                m.price,
                glyph
            ))
        })
        .collect();

    let short_label = format!("SMA {}", analysis.params.short_window);
    let long_label = format!("SMA {}", analysis.params.long_window);

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="{w:.0}" height="{h:.0}" class="chart price-chart">{axes}{band}{close}{short}{long}{markers}{legend}</svg>"#,
        w = WIDTH,
        h = HEIGHT,
        axes = frame.axes(),
        band = band(&frame, &upper, &lower),
        close = polyline(&frame, &close, CLOSE_COLOR, false),
        short = polyline(&frame, &sma_short, SMA_SHORT_COLOR, true),
        long = polyline(&frame, &sma_long, SMA_LONG_COLOR, true),
        markers = markers,
        legend = legend(&[
            ("Close", CLOSE_COLOR),
            (short_label.as_str(), SMA_SHORT_COLOR),
            (long_label.as_str(), SMA_LONG_COLOR),
            ("Bollinger Bands", BAND_COLOR),
            ("Buy", BUY_COLOR),
            ("Sell", SELL_COLOR),
        ]),
    )
}

pub fn generate_equity_svg(portfolio: &[PortfolioState]) -> String {
    let height = 250.0;
    let Some(frame) = Frame::new(
        portfolio.iter().map(|p| p.portfolio_value),
        portfolio.len(),
        height,
    ) else {
        return "No equity data available.".to_string();
    };

    let values: Vec<Option<f64>> = portfolio.iter().map(|p| Some(p.portfolio_value)).collect();

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="{w:.0}" height="{h:.0}" class="chart equity-chart">{axes}{line}{legend}</svg>"#,
        w = WIDTH,
        h = height,
        axes = frame.axes(),
        line = polyline(&frame, &values, CLOSE_COLOR, false),
        legend = legend(&[("Portfolio Value", CLOSE_COLOR)]),
    )
}
