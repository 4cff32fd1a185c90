// ===============================
// src/main.rs
// ===============================
/*
 cd /home/kukuhtw/rust/option_screener

 # jalan tanpa terminal (rantai opsi sintetis)
 MAX_EXPIRATION=2025-11-20 cargo run

 # via bridge MT5, output JSON + metrics textfile
 TERMINAL_MODE=bridge TERMINAL_URL=http://127.0.0.1:8228 REPORT_FORMAT=json \
 METRICS_FILE=/var/lib/node_exporter/option_screener.prom cargo run -- --max-expiration 2025-11-20
*/
/*
=============================================================================
Project : option_screener — listed option screener over a market-data terminal
Module  : main.rs
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
mod domain;
mod config;
mod metrics;
mod symbols;
mod screener;
mod report;
mod terminal;
mod terminal_mock;    // fixture / synthetic chain
mod terminal_bridge;  // HTTP bridge in front of the real terminal

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ScreeningConfig, Settings, TerminalMode};
use crate::report::{ReportFormat, ReportHeader};
use crate::screener::ScreenError;
use crate::terminal::{MarketData, Session, TerminalError};
use crate::terminal_bridge::{BridgeTerminal, Credentials};
use crate::terminal_mock::MockTerminal;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Terminal(#[from] TerminalError),
    #[error(transparent)]
    Screen(#[from] ScreenError),
    #[error("render report: {0}")]
    Render(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    // ---- Logging ----
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ---- Load config ----
    let settings = config::load();

    // ---- Metrics ----
    metrics::init();

    let code = match run(&settings).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "screening run failed");
            1
        }
    };

    if let Some(path) = &settings.metrics_file {
        if let Err(e) = metrics::write_textfile(path).await {
            warn!(?e, %path, "metrics textfile not written");
        }
    }
    std::process::exit(code);
}

async fn run(settings: &Settings) -> Result<(), RunError> {
    let mode = settings.terminal_mode()?;
    let cfg = settings.screening_config()?;
    let format = settings.report_format()?;

    // ---- Startup info (tanpa password) ----
    info!(
        asset = %settings.asset,
        base_asset = %cfg.base_asset,
        right = %cfg.option_right,
        max_expiration = %cfg.max_expiration,
        max_premium_pct = cfg.max_premium_pct,
        min_notional = cfg.min_notional,
        stale_after_days = cfg.stale_after_days,
        segment = %settings.segment,
        terminal = mode.as_str(),
        concurrency = cfg.fetch_concurrency,
        "startup config"
    );
    metrics::CONFIG_RUN
        .with_label_values(&[cfg.base_asset.as_str(), cfg.option_right.as_str(), mode.as_str()])
        .set(1);

    match mode {
        TerminalMode::Mock => {
            let term = match &settings.mock_file {
                Some(path) => MockTerminal::from_file(path)?,
                None => MockTerminal::synthetic(&cfg.base_asset, settings.mock_seed, Utc::now()),
            };
            with_session(&term, settings, &cfg, format).await
        }
        TerminalMode::Bridge => {
            let creds = Credentials {
                login: settings.terminal_login,
                password: settings.terminal_password.clone(),
                server: settings.terminal_server.clone(),
            };
            let term = BridgeTerminal::new(
                &settings.terminal_url,
                creds,
                Duration::from_millis(settings.request_timeout_ms),
            )?;
            with_session(&term, settings, &cfg, format).await
        }
    }
}

/// Session is shut down on every path once it was initialised.
async fn with_session<T: MarketData + Session>(
    term: &T,
    settings: &Settings,
    cfg: &ScreeningConfig,
    format: ReportFormat,
) -> Result<(), RunError> {
    term.initialize().await?;
    let res = screen_and_report(term, settings, cfg, format).await;
    if let Err(e) = term.shutdown().await {
        warn!(error = %e, "terminal shutdown failed");
    }
    res
}

async fn screen_and_report<T: MarketData>(
    term: &T,
    settings: &Settings,
    cfg: &ScreeningConfig,
    format: ReportFormat,
) -> Result<(), RunError> {
    let outcome = screener::screen_universe(
        term,
        cfg,
        &settings.segment,
        settings.trace_symbol.as_deref(),
        Utc::now(),
    )
    .await?;
    metrics::record_outcome(&outcome);
    info!(
        candidates = outcome.candidates,
        matches = outcome.matched.len(),
        rejected = outcome.rejected.len(),
        "screening done"
    );

    let ranked = report::rank(outcome.matched);
    let header = ReportHeader {
        base_asset: cfg.base_asset.clone(),
        max_premium_pct: cfg.max_premium_pct,
        min_notional: cfg.min_notional,
        currency: settings.currency.clone(),
    };
    println!("{}", report::render(&ranked, &header, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instrument, OrderBookSnapshot, QuoteSnapshot};
    use clap::Parser;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FlakyTerminal {
        fail_init: bool,
        shutdowns: AtomicUsize,
    }

    impl MarketData for FlakyTerminal {
        async fn instruments(&self) -> Result<Vec<Instrument>, TerminalError> {
            Err(TerminalError::Status { op: "symbols", status: 503 })
        }
        async fn quote(&self, _symbol: &str) -> Result<Option<QuoteSnapshot>, TerminalError> {
            Ok(None)
        }
        async fn order_book(&self, _symbol: &str) -> Result<Option<OrderBookSnapshot>, TerminalError> {
            Ok(None)
        }
    }

    impl Session for FlakyTerminal {
        async fn initialize(&self) -> Result<(), TerminalError> {
            if self.fail_init {
                return Err(TerminalError::Status { op: "initialize", status: 401 });
            }
            Ok(())
        }
        async fn shutdown(&self) -> Result<(), TerminalError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn settings() -> (Settings, ScreeningConfig) {
        let settings = Settings::try_parse_from(["option_screener", "--max-expiration", "2025-11-20"]).unwrap();
        let cfg = settings.screening_config().unwrap();
        (settings, cfg)
    }

    #[tokio::test]
    async fn session_is_shut_down_when_screening_fails() {
        let (settings, cfg) = settings();
        let term = FlakyTerminal::default();
        let err = with_session(&term, &settings, &cfg, ReportFormat::Text).await.unwrap_err();
        assert!(matches!(err, RunError::Screen(ScreenError::Universe(_))));
        assert_eq!(term.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_initialize_skips_shutdown() {
        let (settings, cfg) = settings();
        let term = FlakyTerminal { fail_init: true, ..Default::default() };
        let err = with_session(&term, &settings, &cfg, ReportFormat::Text).await.unwrap_err();
        assert!(matches!(err, RunError::Terminal(TerminalError::Status { op: "initialize", .. })));
        assert_eq!(term.shutdowns.load(Ordering::SeqCst), 0);
    }
}
