// ===============================
// src/terminal_bridge.rs
// ===============================
//
// Client HTTP ke bridge terminal (proses kecil di samping terminal MT5 yang
// mengekspos data sebagai JSON):
//
//   POST /initialize            {login, password, server}
//   GET  /symbols               -> [Instrument]
//   GET  /symbols/{sym}/tick    -> QuoteSnapshot   (404 = tidak ada data)
//   GET  /symbols/{sym}/book    -> [BookEntry]     (404 = tidak ada data)
//   POST /shutdown
//
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::domain::{Instrument, OrderBookSnapshot, QuoteSnapshot};
use crate::terminal::{MarketData, Session, TerminalError};

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub login: u64,
    pub password: String,
    pub server: String,
}

pub struct BridgeTerminal {
    http: reqwest::Client,
    base: Url,
    creds: Credentials,
}

impl BridgeTerminal {
    pub fn new(base_url: &str, creds: Credentials, timeout: Duration) -> Result<Self, TerminalError> {
        // trailing slash supaya join() tidak membuang segmen terakhir
        let base = if base_url.ends_with('/') { Url::parse(base_url)? } else { Url::parse(&format!("{base_url}/"))? };
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base, creds })
    }

    fn symbol_url(&self, symbol: &str, leaf: &str) -> Result<Url, TerminalError> {
        Ok(self.base.join(&format!("symbols/{}/{}", urlencoding::encode(symbol), leaf))?)
    }

    /// GET that maps 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(&self, url: Url, op: &'static str) -> Result<Option<T>, TerminalError> {
        let rsp = self.http.get(url).send().await?;
        match rsp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(rsp.json::<T>().await?)),
            s => Err(TerminalError::Status { op, status: s.as_u16() }),
        }
    }

    async fn post(&self, path: &str, op: &'static str, body: Option<&Credentials>) -> Result<(), TerminalError> {
        let mut req = self.http.post(self.base.join(path)?);
        if let Some(b) = body {
            req = req.json(b);
        }
        let rsp = req.send().await?;
        if !rsp.status().is_success() {
            return Err(TerminalError::Status { op, status: rsp.status().as_u16() });
        }
        Ok(())
    }
}

impl MarketData for BridgeTerminal {
    async fn instruments(&self) -> Result<Vec<Instrument>, TerminalError> {
        // daftar kosong = "tidak ada data", bukan error
        Ok(self.get_optional(self.base.join("symbols")?, "symbols").await?.unwrap_or_default())
    }

    async fn quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>, TerminalError> {
        self.get_optional(self.symbol_url(symbol, "tick")?, "tick").await
    }

    async fn order_book(&self, symbol: &str) -> Result<Option<OrderBookSnapshot>, TerminalError> {
        self.get_optional(self.symbol_url(symbol, "book")?, "book").await
    }
}

impl Session for BridgeTerminal {
    async fn initialize(&self) -> Result<(), TerminalError> {
        info!(base = %self.base, login = self.creds.login, server = %self.creds.server, "bridge: initializing terminal");
        self.post("initialize", "initialize", Some(&self.creds)).await?;
        info!("bridge: terminal initialized");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TerminalError> {
        info!("bridge: shutting terminal down");
        self.post("shutdown", "shutdown", None).await
    }
}
