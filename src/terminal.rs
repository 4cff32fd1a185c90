// ===============================
// src/terminal.rs
// ===============================
//
// Batas ke terminal market data. Screener hanya melihat trait di bawah;
// koneksi/sesi dikelola oleh shell (main.rs).
//
#![allow(async_fn_in_trait)]

use thiserror::Error;

use crate::domain::{Instrument, OrderBookSnapshot, QuoteSnapshot};

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("terminal transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bad terminal url: {0}")]
    Url(#[from] url::ParseError),
    #[error("terminal rejected {op}: HTTP {status}")]
    Status { op: &'static str, status: u16 },
    #[error("fixture {path}: {source}")]
    Fixture { path: String, source: std::io::Error },
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read-only market data. Per-symbol calls return `Ok(None)` when the
/// terminal has nothing for that symbol.
pub trait MarketData {
    async fn instruments(&self) -> Result<Vec<Instrument>, TerminalError>;
    async fn quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>, TerminalError>;
    async fn order_book(&self, symbol: &str) -> Result<Option<OrderBookSnapshot>, TerminalError>;
}

/// Session lifecycle, owned by the caller of the screener.
pub trait Session {
    async fn initialize(&self) -> Result<(), TerminalError>;
    async fn shutdown(&self) -> Result<(), TerminalError>;
}
