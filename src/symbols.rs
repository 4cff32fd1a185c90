// ===============================
// src/symbols.rs
// ===============================
//
// Symbol classifier:
// - derive_base_asset : "PETR4" -> "PETR", "SANB11" -> "SANB"
// - select_candidates : pilih opsi milik base asset dari daftar simbol terminal
//
use crate::domain::{Instrument, OptionMode, RawOptionDescriptor};

/// Leading alphabetic run of the uppercased code. Codes without one fall
/// back to the whole code, uppercased.
pub fn derive_base_asset(code: &str) -> String {
    let upper = code.to_ascii_uppercase();
    let root: String = upper.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if root.is_empty() { upper } else { root }
}

/// Keep instruments listed under `segment`, named after `base_asset` and
/// flagged as European or American options.
pub fn select_candidates(
    universe: &[Instrument],
    base_asset: &str,
    segment: &str,
) -> Vec<RawOptionDescriptor> {
    let base = base_asset.to_ascii_uppercase();
    let segment = segment.to_ascii_uppercase();

    universe
        .iter()
        .filter(|i| i.path.to_ascii_uppercase().contains(&segment))
        .filter(|i| i.symbol.to_ascii_uppercase().starts_with(&base))
        .filter(|i| OptionMode::from_code(i.option_mode).is_option())
        .map(RawOptionDescriptor::from)
        .collect()
}
