// ===============================
// src/terminal_mock.rs
// ===============================
//
// Terminal in-process:
// - from_file : snapshot JSON {instruments, quotes, books}
// - synthetic : rantai opsi acak (seeded) untuk satu base asset,
//               supaya pipeline bisa jalan tanpa terminal beneran
//
use ahash::AHashMap as HashMap;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{BookEntry, BookSide, Instrument, OrderBookSnapshot, QuoteSnapshot};
use crate::terminal::{MarketData, Session, TerminalError};

// Kode seri B3: call Jan..Des = A..L, put = M..X
const CALL_MONTHS: &[u8] = b"ABCDEFGHIJKL";
const PUT_MONTHS: &[u8] = b"MNOPQRSTUVWX";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MockSnapshot {
    #[serde(default)]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub quotes: HashMap<String, QuoteSnapshot>,
    #[serde(default)]
    pub books: HashMap<String, OrderBookSnapshot>,
}

pub struct MockTerminal {
    snap: MockSnapshot,
}

impl MockTerminal {
    pub fn new(snap: MockSnapshot) -> Self {
        Self { snap }
    }

    pub fn from_file(path: &str) -> Result<Self, TerminalError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| TerminalError::Fixture { path: path.to_string(), source })?;
        let snap: MockSnapshot = serde_json::from_str(&raw)?;
        info!(%path, instruments = snap.instruments.len(), "mock terminal: fixture loaded");
        Ok(Self::new(snap))
    }

    /// Deterministic chain for `base_asset`: the underlying plus calls and
    /// puts over three monthly expirations. Some series are left untraded,
    /// stale or without an ask so every filter has something to do.
    pub fn synthetic(base_asset: &str, seed: u64, now: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut snap = MockSnapshot::default();

        let spot: f64 = rng.gen_range(20.0..60.0);
        let underlying = format!("{base_asset}4");
        snap.instruments.push(Instrument {
            symbol: underlying.clone(),
            path: "BOVESPA\\A VISTA\\".to_string(),
            option_mode: None,
            option_right: None,
            expiration_time: 0,
            last_trade_time: (now - Duration::minutes(1)).timestamp(),
        });
        snap.quotes.insert(underlying, QuoteSnapshot { last: Some(round2(spot)), ask: Some(round2(spot + 0.01)) });

        for month_ahead in 1..=3u32 {
            let Some(expiry) = monthly_expiry(now, month_ahead) else { continue };
            let month_idx = expiry.month0() as usize;

            for (right_code, months) in [(0i64, CALL_MONTHS), (1i64, PUT_MONTHS)] {
                for k in 0..6 {
                    let strike = (spot * (0.85 + 0.06 * k as f64)).round();
                    let symbol = format!("{}{}{}", base_asset, months[month_idx] as char, strike as i64 * 10);

                    let intrinsic = if right_code == 0 { spot - strike } else { strike - spot };
                    let last = round2(intrinsic.max(0.0) + rng.gen_range(0.05..1.5));
                    let ask = round2(last * rng.gen_range(0.9..1.5));

                    let last_trade_time = match rng.gen_range(0..10) {
                        0 => 0,
                        1 => (now - Duration::days(rng.gen_range(3..30))).timestamp(),
                        _ => (now - Duration::minutes(rng.gen_range(1..600))).timestamp(),
                    };

                    snap.instruments.push(Instrument {
                        symbol: symbol.clone(),
                        path: "BOVESPA\\OPCOES\\".to_string(),
                        option_mode: Some(rng.gen_range(0..2)),
                        option_right: Some(right_code),
                        expiration_time: expiry.timestamp(),
                        last_trade_time,
                    });

                    let has_ask = rng.gen_bool(0.9);
                    snap.quotes.insert(
                        symbol.clone(),
                        QuoteSnapshot { last: Some(last), ask: has_ask.then_some(ask) },
                    );

                    let mut book = vec![
                        BookEntry { side: BookSide::Sell, price: round2(ask + 0.02), volume: rng.gen_range(1..50) as f64 * 100.0 },
                        BookEntry { side: BookSide::Buy, price: round2((ask - 0.03).max(0.01)), volume: rng.gen_range(1..50) as f64 * 100.0 },
                    ];
                    if rng.gen_bool(0.8) {
                        book.push(BookEntry { side: BookSide::Sell, price: ask, volume: rng.gen_range(1..20) as f64 * 100.0 });
                    }
                    snap.books.insert(symbol, book);
                }
            }
        }

        info!(base_asset, seed, instruments = snap.instruments.len(), "mock terminal: synthetic chain");
        Self::new(snap)
    }
}

/// Third Friday of the calendar month `months_ahead` after `now`, at 00:00 UTC.
fn monthly_expiry(now: DateTime<Utc>, months_ahead: u32) -> Option<DateTime<Utc>> {
    let idx = now.month0() + months_ahead;
    let year = now.year() + (idx / 12) as i32;
    let day = NaiveDate::from_weekday_of_month_opt(year, idx % 12 + 1, Weekday::Fri, 3)?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl MarketData for MockTerminal {
    async fn instruments(&self) -> Result<Vec<Instrument>, TerminalError> {
        Ok(self.snap.instruments.clone())
    }

    async fn quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>, TerminalError> {
        Ok(self.snap.quotes.get(symbol).copied())
    }

    async fn order_book(&self, symbol: &str) -> Result<Option<OrderBookSnapshot>, TerminalError> {
        Ok(self.snap.books.get(symbol).cloned())
    }
}

impl Session for MockTerminal {
    async fn initialize(&self) -> Result<(), TerminalError> {
        info!("mock terminal: session up");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), TerminalError> {
        info!("mock terminal: session down");
        Ok(())
    }
}
