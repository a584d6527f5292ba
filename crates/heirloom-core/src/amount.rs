//! Fixed-point coin amounts.
//!
//! Every monetary computation runs on `i64` satoshis. Decimal strings only
//! exist at the edges: user input, the stored snapshot fields, display.
//! Fee rates reuse the same 8-decimal representation (units of 1e-8 sat/vB)
//! so a fee is an exact integer product, never a float.

use bitcoin::{Denomination, SignedAmount};

/// Satoshis per whole coin.
pub const SATS_PER_COIN: i64 = 100_000_000;

/// Decimal places kept by every fixed-point string.
pub const DECIMALS: usize = 8;

/// Largest magnitude accepted by [`parse_fixed8`]: the 21M coin supply.
pub const MAX_FIXED8: i64 = 21_000_000 * SATS_PER_COIN;

/// Parse a decimal string into 1e-8 units, truncating past the 8th decimal.
///
/// Returns `None` for blank or malformed input, and for magnitudes above
/// [`MAX_FIXED8`].
pub fn parse_fixed8(value: &str) -> Option<i64> {
    let trimmed = truncate_decimals(value.trim())?;
    if trimmed.is_empty() {
        return None;
    }
    SignedAmount::from_str_in(trimmed, Denomination::Bitcoin)
        .ok()
        .map(|amount| amount.to_sat())
        .filter(|sats| sats.unsigned_abs() <= MAX_FIXED8 as u64)
}

/// Parse a coin amount into satoshis; malformed input counts as zero.
pub fn sats_or_zero(value: &str) -> i64 {
    match parse_fixed8(value) {
        Some(sats) => sats,
        None => {
            if !value.trim().is_empty() {
                log::warn!("treating malformed amount {:?} as zero", value);
            }
            0
        }
    }
}

/// Format satoshis as a coin string with exactly 8 decimals.
pub fn format_sats(sats: i64) -> String {
    let sign = if sats < 0 { "-" } else { "" };
    let abs = sats.unsigned_abs();
    let per_coin = SATS_PER_COIN as u64;
    format!("{}{}.{:08}", sign, abs / per_coin, abs % per_coin)
}

/// `ceil(vsize * fee_rate)` in satoshis, with the rate in 1e-8 sat/vB units.
///
/// Negative rates are clamped to zero.
pub fn fee_for_vsize(vsize: u64, fee_rate_e8: i64) -> i64 {
    let rate = i128::from(fee_rate_e8.max(0));
    let scale = i128::from(SATS_PER_COIN);
    let product = i128::from(vsize) * rate;
    let fee = (product + scale - 1) / scale;
    i64::try_from(fee).unwrap_or(i64::MAX)
}

/// Cut the fractional part of a decimal string down to 8 digits.
///
/// `None` if the cut would split a multi-byte character.
fn truncate_decimals(value: &str) -> Option<&str> {
    match value.find('.') {
        Some(dot) if value.len() - dot - 1 > DECIMALS => value.get(..dot + 1 + DECIMALS),
        _ => Some(value),
    }
}
