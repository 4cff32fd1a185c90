// ===============================
// src/report.rs
// ===============================
use std::fmt::Write as _;

use crate::domain::ScreenedOption;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("unknown report format: {s}")),
        }
    }
}

/// Display-only parameters taken from the run configuration.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub base_asset: String,
    pub max_premium_pct: f64,
    pub min_notional: f64,
    pub currency: String,
}

/// Stable sort, notional at ask descending. Ties keep input order.
pub fn rank(mut screened: Vec<ScreenedOption>) -> Vec<ScreenedOption> {
    screened.sort_by(|a, b| b.notional_at_ask.total_cmp(&a.notional_at_ask));
    screened
}

pub fn render_text(ranked: &[ScreenedOption], h: &ReportHeader) -> String {
    let mut out = String::new();
    if ranked.is_empty() {
        let _ = writeln!(
            out,
            "No {} options matched the criteria (minimum tradable notional {} {:.2}).",
            h.base_asset, h.currency, h.min_notional
        );
        return out;
    }

    let _ = writeln!(
        out,
        "{} options with ask up to {}% above last trade, non-zero prices and tradable notional of at least {} {:.2}:",
        h.base_asset, h.max_premium_pct, h.currency, h.min_notional
    );
    for o in ranked {
        let _ = writeln!(
            out,
            "{} - {} - {} - LAST:{:.2} - ASK:{:.2} - PCT:{:.2}% - DTHLAST: {} - QTY:{:.0} - NOTIONAL: {} {:.2}",
            o.symbol,
            o.option_right,
            o.expiration_date.format("%Y-%m-%d"),
            o.last_price,
            o.ask_price,
            o.premium_pct,
            o.last_trade.format("%Y-%m-%d %H:%M:%S"),
            o.available_qty_at_ask,
            h.currency,
            o.notional_at_ask,
        );
    }
    out
}

pub fn render_json(ranked: &[ScreenedOption]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(ranked)
}

pub fn render(ranked: &[ScreenedOption], h: &ReportHeader, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(render_text(ranked, h)),
        ReportFormat::Json => render_json(ranked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionRight;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn opt(symbol: &str, notional: f64) -> ScreenedOption {
        ScreenedOption {
            symbol: symbol.into(),
            option_right: OptionRight::Call,
            expiration_date: NaiveDate::from_ymd_opt(2025, 10, 17).unwrap(),
            last_price: 1.0,
            ask_price: 1.05,
            available_qty_at_ask: notional / 1.05,
            notional_at_ask: notional,
            premium_pct: 5.0,
            last_trade: Utc.with_ymd_and_hms(2025, 10, 1, 10, 30, 0).unwrap(),
        }
    }

    fn header() -> ReportHeader {
        ReportHeader { base_asset: "PETR".into(), max_premium_pct: 30.0, min_notional: 100.0, currency: "R$".into() }
    }

    #[test]
    fn rank_orders_by_notional_desc() {
        let ranked = rank(vec![opt("A", 150.0), opt("B", 900.0), opt("C", 300.0)]);
        let names: Vec<_> = ranked.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let ranked = rank(vec![opt("A", 200.0), opt("B", 500.0), opt("C", 200.0), opt("D", 200.0)]);
        let names: Vec<_> = ranked.iter().map(|o| o.symbol.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn empty_report_is_single_line() {
        let text = render_text(&[], &header());
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("No PETR options"));
        assert!(text.contains("R$ 100.00"));
    }

    #[test]
    fn text_report_has_one_line_per_entry() {
        let text = render_text(&[opt("PETRJ30", 315.0)], &header());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("PETR options with ask up to 30%"));
        assert_eq!(
            lines[1],
            "PETRJ30 - CALL - 2025-10-17 - LAST:1.00 - ASK:1.05 - PCT:5.00% - DTHLAST: 2025-10-01 10:30:00 - QTY:300 - NOTIONAL: R$ 315.00"
        );
    }

    #[test]
    fn json_report_lists_entries() {
        let json = render(&[opt("PETRJ30", 315.0)], &header(), ReportFormat::Json).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v[0]["symbol"], "PETRJ30");
        assert_eq!(v[0]["option_right"], "CALL");
        assert_eq!(v[0]["expiration_date"], "2025-10-17");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("markdown".parse::<ReportFormat>().is_err());
    }
}
