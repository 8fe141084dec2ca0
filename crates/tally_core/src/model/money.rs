//! Currency-safe split arithmetic.
//!
//! # Responsibility
//! - Convert currency amounts to integer cents and back.
//! - Split a bill total evenly across payers without losing cents.
//!
//! # Invariants
//! - Amounts convert to cents only when they are whole cents and their
//!   magnitude stays within `MAX_CENTS`, so `f64` holds them exactly.
//! - `split_cents(total, n)` always sums to `total` for `n > 0`.
//! - Shares differ by at most one cent; earlier payers receive the extra
//!   cents.

/// Integer minor currency units.
pub type Cents = i64;

/// Accumulator for sums over many bills; cannot overflow for any
/// realistic number of bounded amounts.
pub type CentsSum = i128;

/// Largest magnitude, in cents, an `f64` represents exactly (2^53).
pub const MAX_CENTS: Cents = 9_007_199_254_740_992;

/// Fractions of a cent below this are treated as float noise.
const CENT_TOLERANCE: f64 = 1e-6;

/// Why an amount has no exact cents representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CentsError {
    NonFinite,
    OutOfRange,
    FractionalCents,
}

/// Converts a currency amount to exact cents.
pub fn to_cents(amount: f64) -> Result<Cents, CentsError> {
    if !amount.is_finite() {
        return Err(CentsError::NonFinite);
    }
    let scaled = amount * 100.0;
    let rounded = scaled.round();
    if rounded.abs() > MAX_CENTS as f64 {
        return Err(CentsError::OutOfRange);
    }
    if (scaled - rounded).abs() > CENT_TOLERANCE {
        return Err(CentsError::FractionalCents);
    }
    Ok(rounded as Cents)
}

pub fn from_cents(cents: CentsSum) -> f64 {
    cents as f64 / 100.0
}

/// Splits `total` into `parts` shares that sum back to `total`.
///
/// Returns an empty vector when `parts == 0`: a bill with no payers owes
/// nothing to anyone.
pub fn split_cents(total: Cents, parts: usize) -> Vec<Cents> {
    if parts == 0 {
        return Vec::new();
    }

    let divisor = parts as Cents;
    let base = total.div_euclid(divisor);
    let remainder = total.rem_euclid(divisor) as usize;

    (0..parts)
        .map(|index| if index < remainder { base + 1 } else { base })
        .collect()
}
