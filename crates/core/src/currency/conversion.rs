//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's decimal places
//! - Use the registry's fixed rounding mode (half-up unless configured)
//! - Multiply before dividing so no precision is lost on the way
//! - Re-based rates keep significant digits, not decimal places

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tally_shared::types::RoundingMode;

/// Converts `amount` from a currency quoted at `from_rate` to one quoted at
/// `to_rate` (both as units of base per unit).
///
/// Returns `None` if the intermediate arithmetic overflows.
#[must_use]
pub fn convert_amount(
    amount: Decimal,
    from_rate: Decimal,
    to_rate: Decimal,
    decimal_places: u32,
    rounding: RoundingMode,
) -> Option<Decimal> {
    let converted = amount.checked_mul(from_rate)?.checked_div(to_rate)?;
    Some(rounding.round(converted, decimal_places))
}

/// Re-expresses a rate quoted against the old base as a rate against a
/// new base whose old rate was `new_base_rate`.
///
/// The quotient is rounded to `significant_digits` (clamped to 1..=28), never
/// to a fixed number of decimal places, so tiny and huge rates keep the same
/// relative precision. Returns `None` when the division overflows or the
/// result is not positive.
#[must_use]
pub fn rebase_rate(
    rate: Decimal,
    new_base_rate: Decimal,
    significant_digits: u32,
    rounding: RoundingMode,
) -> Option<Decimal> {
    let quotient = rate.checked_div(new_base_rate)?;
    if quotient <= Decimal::ZERO {
        return None;
    }
    quotient
        .round_sf_with_strategy(significant_digits.clamp(1, 28), rounding.strategy())
        .map(|r| r.normalize())
        .filter(|r| *r > Decimal::ZERO)
}

/// Splits `total` over `parts` so the pieces add up to `total` exactly.
///
/// Largest Remainder Method: every part is rounded down to
/// `decimal_places`, then the units still missing go one each to the parts
/// with the largest remainders (earlier parts win ties). `total` is expected
/// to be `sum(parts)` rounded to `decimal_places`.
#[must_use]
pub fn allocate_rounded(parts: &[Decimal], total: Decimal, decimal_places: u32) -> Vec<Decimal> {
    let decimal_places = decimal_places.min(28);
    let unit = Decimal::new(1, decimal_places);
    let mut allocated: Vec<Decimal> = parts
        .iter()
        .map(|part| part.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
        .collect();

    let assigned = allocated
        .iter()
        .try_fold(Decimal::ZERO, |sum, part| sum.checked_add(*part));
    let missing = assigned
        .and_then(|assigned| total.checked_sub(assigned))
        .and_then(|gap| gap.checked_div(unit))
        .and_then(|units| units.trunc().to_usize())
        .unwrap_or(0)
        .min(parts.len());

    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|a, b| {
        let remainder = |i: usize| parts[i] - allocated[i];
        remainder(*b).cmp(&remainder(*a))
    });
    for index in order.into_iter().take(missing) {
        allocated[index] += unit;
    }
    allocated
}
