// ===============================
// src/config.rs
// ===============================
/*
=============================================================================
Project : option_screener — listed option screener over a market-data terminal
Module  : config.rs
Version : 0.1.0
Author  : Kukuh Tripamungkas Wicaksono (Kukuh TW)
Email   : kukuhtw@gmail.com
WhatsApp: https://wa.me/628129893706
LinkedIn: https://id.linkedin.com/in/kukuhtw
License : MIT (see LICENSE)

Summary : Enumerates option contracts for an underlying from a terminal
          (mock or HTTP bridge), filters them by expiration, recent trade,
          ask premium over last price and notional at the best ask, then
          ranks and prints the survivors.

(c) 2025 Kukuh TW. All rights reserved where applicable.
=============================================================================
*/
use chrono::NaiveDate;
use clap::Parser;
use dotenvy::dotenv;
use thiserror::Error;

use crate::domain::OptionRight;
use crate::report::ReportFormat;
use crate::symbols::derive_base_asset;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field}: invalid date {value:?} (expected YYYY-MM-DD)")]
    Date { field: &'static str, value: String },
    #[error("{field}: unknown value {value:?}")]
    Unknown { field: &'static str, value: String },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Sumber data terminal
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalMode {
    Mock,
    Bridge,
}

impl TerminalMode {
    pub fn parse(s: &str) -> Option<TerminalMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock"   => Some(TerminalMode::Mock),
            "bridge" | "mt5" => Some(TerminalMode::Bridge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self { TerminalMode::Mock => "mock", TerminalMode::Bridge => "bridge" }
    }
}

/// Immutable, fully resolved screening parameters handed to the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreeningConfig {
    pub base_asset: String,
    pub option_right: OptionRight,
    pub max_expiration: NaiveDate,
    pub max_premium_pct: f64,
    pub min_notional: f64,
    pub stale_after_days: u32,
    pub fetch_concurrency: usize,
}

impl ScreeningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_asset.trim().is_empty() {
            return Err(invalid("base_asset", "must not be empty"));
        }
        if !matches!(self.option_right, OptionRight::Call | OptionRight::Put) {
            return Err(invalid("option_right", "must be CALL or PUT"));
        }
        if !self.max_premium_pct.is_finite() || self.max_premium_pct < 0.0 {
            return Err(invalid("max_premium_pct", "must be a finite number >= 0"));
        }
        if !self.min_notional.is_finite() || self.min_notional < 0.0 {
            return Err(invalid("min_notional", "must be a finite number >= 0"));
        }
        if self.fetch_concurrency == 0 {
            return Err(invalid("fetch_concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

#[derive(Clone, Parser)]
#[command(name = "option_screener", version, about = "Screen listed options by ask premium and notional at the best ask")]
pub struct Settings {
    // screening
    /// Full instrument code of the underlying (PETR4, SANB11, ...)
    #[arg(long, env = "ASSET", default_value = "PETR4")]
    pub asset: String,
    #[arg(long, env = "OPTION_RIGHT", default_value = "call")]
    pub option_right: String,
    /// Inclusive upper bound on expiration, YYYY-MM-DD
    #[arg(long, env = "MAX_EXPIRATION")]
    pub max_expiration: String,
    #[arg(long, env = "MAX_PREMIUM_PCT", default_value_t = 30.0)]
    pub max_premium_pct: f64,
    #[arg(long, env = "MIN_NOTIONAL", default_value_t = 100.0)]
    pub min_notional: f64,
    #[arg(long, env = "STALE_AFTER_DAYS", default_value_t = 2)]
    pub stale_after_days: u32,
    /// Segment path marker of the exchange listing
    #[arg(long, env = "SEGMENT", default_value = "BOVESPA")]
    pub segment: String,
    #[arg(long, env = "FETCH_CONCURRENCY", default_value_t = 8)]
    pub fetch_concurrency: usize,
    #[arg(long, env = "TRACE_SYMBOL")]
    pub trace_symbol: Option<String>,

    // terminal
    #[arg(long, env = "TERMINAL_MODE", default_value = "mock")]
    pub terminal_mode: String,
    #[arg(long, env = "TERMINAL_URL", default_value = "http://127.0.0.1:8228")]
    pub terminal_url: String,
    #[arg(long, env = "TERMINAL_LOGIN", default_value_t = 0)]
    pub terminal_login: u64,
    #[arg(long, env = "TERMINAL_PASSWORD", default_value = "", hide_env_values = true)]
    pub terminal_password: String,
    #[arg(long, env = "TERMINAL_SERVER", default_value = "")]
    pub terminal_server: String,
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 5000)]
    pub request_timeout_ms: u64,
    #[arg(long, env = "MOCK_FILE")]
    pub mock_file: Option<String>,
    #[arg(long, env = "MOCK_SEED", default_value_t = 7)]
    pub mock_seed: u64,

    // output
    #[arg(long, env = "REPORT_FORMAT", default_value = "text")]
    pub report_format: String,
    #[arg(long, env = "CURRENCY", default_value = "R$")]
    pub currency: String,
    #[arg(long, env = "METRICS_FILE")]
    pub metrics_file: Option<String>,
}

impl Settings {
    pub fn base_asset(&self) -> String {
        derive_base_asset(&self.asset)
    }

    pub fn terminal_mode(&self) -> Result<TerminalMode, ConfigError> {
        TerminalMode::parse(&self.terminal_mode).ok_or_else(|| ConfigError::Unknown {
            field: "terminal_mode",
            value: self.terminal_mode.clone(),
        })
    }

    pub fn report_format(&self) -> Result<ReportFormat, ConfigError> {
        self.report_format.parse().map_err(|_| ConfigError::Unknown {
            field: "report_format",
            value: self.report_format.clone(),
        })
    }

    pub fn screening_config(&self) -> Result<ScreeningConfig, ConfigError> {
        let option_right = match self.option_right.trim().to_ascii_uppercase().as_str() {
            "CALL" => OptionRight::Call,
            "PUT"  => OptionRight::Put,
            _ => {
                return Err(ConfigError::Unknown { field: "option_right", value: self.option_right.clone() })
            }
        };
        let max_expiration = NaiveDate::parse_from_str(self.max_expiration.trim(), "%Y-%m-%d")
            .map_err(|_| ConfigError::Date { field: "max_expiration", value: self.max_expiration.clone() })?;

        let cfg = ScreeningConfig {
            base_asset: self.base_asset(),
            option_right,
            max_expiration,
            max_premium_pct: self.max_premium_pct,
            min_notional: self.min_notional,
            stale_after_days: self.stale_after_days,
            fetch_concurrency: self.fetch_concurrency,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

pub fn load() -> Settings {
    // .env dibaca dulu supaya clap bisa ambil nilai dari env
    let _ = dotenv();
    Settings::parse()
}
