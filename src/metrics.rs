// ===============================
// src/metrics.rs
// ===============================
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::path::Path;
use tracing::info;

use crate::screener::ScreenOutcome;

// Single custom registry (we register everything here)
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

// -------- Screening run --------
pub static CANDIDATES: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("screen_candidates_total", "option candidates evaluated").unwrap());

pub static MATCHES: Lazy<IntCounter> =
    Lazy::new(|| IntCounter::new("screen_matches_total", "candidates passing every filter").unwrap());

pub static REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("screen_rejections_total", "rejected candidates by first failing filter"),
        &["reason"],
    )
    .unwrap()
});

// ---- Config visibility ----
pub static CONFIG_RUN: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("config_run", "screening run (labels: base_asset, right, terminal)"),
        &["base_asset", "right", "terminal"],
    )
    .unwrap()
});

pub fn init() {
    for m in [
        REGISTRY.register(Box::new(CANDIDATES.clone())),
        REGISTRY.register(Box::new(MATCHES.clone())),
        REGISTRY.register(Box::new(REJECTIONS.clone())),
        REGISTRY.register(Box::new(CONFIG_RUN.clone())),
    ] {
        let _ = m;
    }
}

/// Fold one finished batch into the run counters.
pub fn record_outcome(outcome: &ScreenOutcome) {
    CANDIDATES.inc_by(outcome.candidates as u64);
    MATCHES.inc_by(outcome.matched.len() as u64);
    for (_, reason) in &outcome.rejected {
        REJECTIONS.with_label_values(&[reason.label()]).inc();
    }
}

// Encode all metrics in Prometheus text format
pub fn encode_metrics() -> Vec<u8> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buf = Vec::new();
    if encoder.encode(&families, &mut buf).is_err() || buf.is_empty() {
        buf.extend_from_slice(b"# no metrics\n");
    }
    buf
}

/// Dump the registry for a node_exporter textfile collector. Written to a
/// temp file first so the collector never reads a half-written file.
pub async fn write_textfile(path: &str) -> std::io::Result<()> {
    let target = Path::new(path);
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp = target.with_extension("prom.tmp");
    tokio::fs::write(&tmp, encode_metrics()).await?;
    tokio::fs::rename(&tmp, target).await?;
    info!(%path, "metrics written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::screener::Rejection;

    #[test]
    fn registry_exports_screen_counters() {
        init();
        let outcome = ScreenOutcome {
            candidates: 3,
            matched: Vec::new(),
            rejected: vec![("A".into(), Rejection::Premium), ("B".into(), Rejection::Stale)],
        };
        let before = REJECTIONS.with_label_values(&["premium"]).get();
        record_outcome(&outcome);
        assert_eq!(REJECTIONS.with_label_values(&["premium"]).get(), before + 1);
        let text = String::from_utf8(encode_metrics()).unwrap();
        assert!(text.contains("screen_candidates_total"));
        assert!(text.contains("screen_rejections_total{reason=\"premium\"}"));
        assert!(text.contains("screen_rejections_total{reason=\"stale\"}"));
    }

    #[tokio::test]
    async fn textfile_is_written() {
        init();
        MATCHES.inc();
        let dir = std::env::temp_dir().join(format!("option_screener_metrics_{}", std::process::id()));
        let path = dir.join("screen.prom");
        write_textfile(path.to_str().unwrap()).await.unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("screen_matches_total"));
        let _ = std::fs::remove_dir_all(dir);
    }
}
