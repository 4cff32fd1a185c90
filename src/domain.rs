// ===============================
// src/domain.rs
// ===============================
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Arah kontrak opsi. Kode terminal: 0 = CALL, 1 = PUT, selain itu UNKNOWN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionRight { Call, Put, Unknown }

impl OptionRight {
    pub fn from_code(code: i64) -> Self {
        match code { 0 => OptionRight::Call, 1 => OptionRight::Put, _ => OptionRight::Unknown }
    }
    pub fn as_str(&self) -> &'static str {
        match self { OptionRight::Call => "CALL", OptionRight::Put => "PUT", OptionRight::Unknown => "UNKNOWN" }
    }
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

/// Exercise style as reported by the terminal. Anything that is not European
/// or American is not an option contract for our purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMode { European, American, NotAnOption }

impl OptionMode {
    pub fn from_code(code: Option<i64>) -> Self {
        match code { Some(0) => OptionMode::European, Some(1) => OptionMode::American, _ => OptionMode::NotAnOption }
    }
    pub fn is_option(&self) -> bool { matches!(self, OptionMode::European | OptionMode::American) }
}

/// One row of the terminal's symbol listing (static info only, no prices).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub option_mode: Option<i64>,
    #[serde(default)]
    pub option_right: Option<i64>,
    #[serde(default)]
    pub expiration_time: i64,
    #[serde(default)]
    pub last_trade_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOptionDescriptor {
    pub symbol: String,
    pub option_right: OptionRight,
    /// 0 = no expiration recorded
    pub expiration_epoch: i64,
    /// 0 = never traded
    pub last_trade_epoch: i64,
}

impl From<&Instrument> for RawOptionDescriptor {
    fn from(i: &Instrument) -> Self {
        Self {
            symbol: i.symbol.clone(),
            option_right: i.option_right.map(OptionRight::from_code).unwrap_or(OptionRight::Unknown),
            expiration_epoch: i.expiration_time,
            last_trade_epoch: i.last_trade_time,
        }
    }
}

/// Live tick snapshot. Zero or missing means "no valid value".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    #[serde(default)]
    pub last: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookSide {
    Sell,
    Buy,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookEntry { pub side: BookSide, pub price: f64, pub volume: f64 }

pub type OrderBookSnapshot = Vec<BookEntry>;

/// Kandidat yang lolos semua filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenedOption {
    pub symbol: String,
    pub option_right: OptionRight,
    pub expiration_date: NaiveDate,
    pub last_price: f64,
    pub ask_price: f64,
    pub available_qty_at_ask: f64,
    pub notional_at_ask: f64,
    pub premium_pct: f64,
    pub last_trade: DateTime<Utc>,
}
