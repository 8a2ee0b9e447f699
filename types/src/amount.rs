//! Fixed-point helpers for stake-weighted math.
//!
//! Amounts are raw `u128` units. Ratios are expressed in `PRECISION` (1e18 = 100%)
//! and protocol fees in basis points (`BPS` = 10_000 = 100%). All divisions
//! truncate toward zero.

use num_bigint::BigUint;

/// Fixed-point scale for percentages: `PRECISION` represents 100%.
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Basis-point scale: `BPS` represents 100%.
pub const BPS: u128 = 10_000;

/// Compute `a * b / denominator` without intermediate overflow, truncating.
///
/// Returns `None` when `denominator` is zero or the quotient does not fit in a `u128`.
/// Stake amounts in raw units easily exceed `u128::MAX / PRECISION`, so the
/// product is widened whenever the narrow multiply would overflow.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }
    let wide = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    u128::try_from(wide).ok()
}

/// Whether `a * b >= c * d`, compared at full width.
pub fn product_gte(a: u128, b: u128, c: u128, d: u128) -> bool {
    match (a.checked_mul(b), c.checked_mul(d)) {
        (Some(lhs), Some(rhs)) => lhs >= rhs,
        _ => BigUint::from(a) * BigUint::from(b) >= BigUint::from(c) * BigUint::from(d),
    }
}
