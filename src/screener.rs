// ===============================
// src/screener.rs
// ===============================
//
// Eligibility & derivation engine.
//
// Urutan filter per kandidat (berhenti di kegagalan pertama):
//   1) right        5) book depth @ ask
//   2) expiration   6) konversi numerik / timestamp
//   3) quote        7) staleness
//   4) last trade   8) premium, 9) notional
//
// Quote hanya di-fetch kalau 1-2 lolos, book hanya kalau 1-4 lolos.
// Data per-simbol yang jelek = simbol dibuang, bukan error.
//
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures_util::{stream, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ScreeningConfig};
use crate::domain::{BookEntry, BookSide, QuoteSnapshot, RawOptionDescriptor, ScreenedOption};
use crate::symbols::select_candidates;
use crate::terminal::{MarketData, TerminalError};

/// Absolute tolerance when matching book levels against the ask.
pub const BOOK_PRICE_EPSILON: f64 = 1e-5;

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("invalid screening config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("cannot enumerate instruments: {0}")]
    Universe(#[from] TerminalError),
}

/// Why a single candidate was dropped. Reported per symbol, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("option right does not match")]
    Right,
    #[error("no expiration or expires after the limit")]
    Expiration,
    #[error("no usable last/ask quote")]
    Quote,
    #[error("never traded")]
    NoTrade,
    #[error("no sell volume at the ask")]
    BookDepth,
    #[error("malformed numeric or timestamp field")]
    Conversion,
    #[error("last trade older than the staleness window")]
    Stale,
    #[error("ask premium above the limit")]
    Premium,
    #[error("notional at ask below the minimum")]
    Notional,
    #[error("terminal fetch failed")]
    Fetch,
}

impl Rejection {
    pub fn label(&self) -> &'static str {
        match self {
            Rejection::Right => "right",
            Rejection::Expiration => "expiration",
            Rejection::Quote => "quote",
            Rejection::NoTrade => "no_trade",
            Rejection::BookDepth => "book_depth",
            Rejection::Conversion => "conversion",
            Rejection::Stale => "stale",
            Rejection::Premium => "premium",
            Rejection::Notional => "notional",
            Rejection::Fetch => "fetch",
        }
    }
}

fn epoch_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
}

fn check_expiration(c: &RawOptionDescriptor, cfg: &ScreeningConfig) -> Result<NaiveDate, Rejection> {
    if c.expiration_epoch == 0 {
        return Err(Rejection::Expiration);
    }
    let date = epoch_to_utc(c.expiration_epoch).ok_or(Rejection::Expiration)?.date_naive();
    if date > cfg.max_expiration {
        return Err(Rejection::Expiration);
    }
    Ok(date)
}

fn check_quote(q: Option<QuoteSnapshot>) -> Result<(f64, f64), Rejection> {
    let q = q.ok_or(Rejection::Quote)?;
    match (q.last, q.ask) {
        (Some(last), Some(ask)) if last > 0.0 && ask > 0.0 => Ok((last, ask)),
        _ => Err(Rejection::Quote),
    }
}

/// Sum of sell volume resting at `ask` (within [`BOOK_PRICE_EPSILON`]).
pub fn available_at_ask(book: &[BookEntry], ask: f64) -> f64 {
    book.iter()
        .filter(|e| e.side == BookSide::Sell && (e.price - ask).abs() < BOOK_PRICE_EPSILON)
        .map(|e| e.volume)
        .sum()
}

/// Steps 6-9: pure arithmetic on already fetched values.
fn derive(
    c: &RawOptionDescriptor,
    expiration_date: NaiveDate,
    last: f64,
    ask: f64,
    qty: f64,
    cfg: &ScreeningConfig,
    now: DateTime<Utc>,
) -> Result<ScreenedOption, Rejection> {
    if !(last.is_finite() && ask.is_finite() && qty.is_finite()) {
        return Err(Rejection::Conversion);
    }
    let last_trade = epoch_to_utc(c.last_trade_epoch).ok_or(Rejection::Conversion)?;

    // window lebih lebar dari rentang chrono = tidak ada batas
    let cutoff = Duration::try_days(i64::from(cfg.stale_after_days)).and_then(|d| now.checked_sub_signed(d));
    if cutoff.is_some_and(|cutoff| last_trade < cutoff) {
        return Err(Rejection::Stale);
    }

    let upper = last * (1.0 + cfg.max_premium_pct / 100.0);
    if ask > upper {
        return Err(Rejection::Premium);
    }
    let premium_pct = (ask / last - 1.0) * 100.0;

    let notional = ask * qty;
    if notional < cfg.min_notional {
        return Err(Rejection::Notional);
    }

    Ok(ScreenedOption {
        symbol: c.symbol.clone(),
        option_right: c.option_right,
        expiration_date,
        last_price: last,
        ask_price: ask,
        available_qty_at_ask: qty,
        notional_at_ask: notional,
        premium_pct,
        last_trade,
    })
}

/// Run every predicate for one candidate, fetching snapshots lazily.
pub async fn evaluate<S: MarketData>(
    c: &RawOptionDescriptor,
    cfg: &ScreeningConfig,
    source: &S,
    now: DateTime<Utc>,
) -> Result<ScreenedOption, Rejection> {
    // 1) right (UNKNOWN never equals a validated filter)
    if c.option_right != cfg.option_right {
        return Err(Rejection::Right);
    }
    // 2) expiration
    let expiration_date = check_expiration(c, cfg)?;

    // 3) quote
    let quote = source.quote(&c.symbol).await.map_err(|e| {
        warn!(symbol = %c.symbol, error = %e, "quote fetch failed");
        Rejection::Fetch
    })?;
    let (last, ask) = check_quote(quote)?;

    // 4) harus pernah ada trade beneran
    if c.last_trade_epoch == 0 {
        return Err(Rejection::NoTrade);
    }

    // 5) book depth
    let book = source.order_book(&c.symbol).await.map_err(|e| {
        warn!(symbol = %c.symbol, error = %e, "book fetch failed");
        Rejection::Fetch
    })?;
    let qty = book.as_deref().map(|b| available_at_ask(b, ask)).unwrap_or(0.0);
    if qty == 0.0 || qty.is_nan() {
        return Err(Rejection::BookDepth);
    }

    // 6-9)
    derive(c, expiration_date, last, ask, qty, cfg, now)
}

/// Result of one batch: survivors in candidate order, plus the first
/// failing filter of every dropped symbol.
#[derive(Debug, Default)]
pub struct ScreenOutcome {
    pub candidates: usize,
    pub matched: Vec<ScreenedOption>,
    pub rejected: Vec<(String, Rejection)>,
}

/// Screen a batch. Output keeps candidate order; ranking is the caller's job.
pub async fn screen<S: MarketData>(
    candidates: &[RawOptionDescriptor],
    cfg: &ScreeningConfig,
    source: &S,
    now: DateTime<Utc>,
) -> Result<ScreenOutcome, ScreenError> {
    cfg.validate()?;

    // buffered() = fan-out terbatas, hasil tetap urut input
    let results: Vec<_> = stream::iter(candidates)
        .map(move |c| async move { (c, evaluate(c, cfg, source, now).await) })
        .buffered(cfg.fetch_concurrency)
        .collect()
        .await;

    let mut out = ScreenOutcome { candidates: candidates.len(), ..Default::default() };
    for (c, res) in results {
        match res {
            Ok(opt) => out.matched.push(opt),
            Err(r) => {
                debug!(symbol = %c.symbol, reason = %r, "rejected");
                out.rejected.push((c.symbol.clone(), r));
            }
        }
    }
    Ok(out)
}

/// Enumerate the terminal universe, pick candidates for the base asset and
/// screen them. `trace` names a symbol to dump through [`trace_symbol`].
pub async fn screen_universe<S: MarketData>(
    source: &S,
    cfg: &ScreeningConfig,
    segment: &str,
    trace: Option<&str>,
    now: DateTime<Utc>,
) -> Result<ScreenOutcome, ScreenError> {
    cfg.validate()?;
    let universe = source.instruments().await?;
    let candidates = select_candidates(&universe, &cfg.base_asset, segment);
    info!(
        base_asset = %cfg.base_asset,
        universe = universe.len(),
        candidates = candidates.len(),
        "raw option candidates"
    );
    if let Some(sym) = trace {
        trace_symbol(&candidates, sym, source).await;
    }
    screen(&candidates, cfg, source, now).await
}

/// Debug hook: dump static fields and the live quote of one symbol.
/// Has no effect on eligibility.
pub async fn trace_symbol<S: MarketData>(candidates: &[RawOptionDescriptor], symbol: &str, source: &S) {
    for c in candidates.iter().filter(|c| c.symbol.eq_ignore_ascii_case(symbol)) {
        let expiration = epoch_to_utc(c.expiration_epoch)
            .filter(|_| c.expiration_epoch != 0)
            .map(|d| d.date_naive().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let quote = source.quote(&c.symbol).await.ok().flatten().unwrap_or_default();
        info!(
            symbol = %c.symbol,
            expiration = %expiration,
            right = %c.option_right,
            last = quote.last.unwrap_or(0.0),
            ask = quote.ask.unwrap_or(0.0),
            "trace"
        );
    }
}
