//! Property-based tests for the currency registry.
//!
//! - Round-trip conversion stays within one minor unit
//! - Re-basing preserves every cross rate
//! - Re-basing keeps exactly one base at rate 1
//! - Cross rates survive re-basing across wide rate ranges
//! - A failed re-basing changes nothing

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{CurrencyCode, Money};

use super::error::CurrencyError;
use super::registry::CurrencyRegistry;
use super::types::{Currency, RateSettings};

/// Strategy to generate exchange rates (0.0100 to 1000.0000).
fn rate() -> impl Strategy<Value = Decimal> {
    (100i64..10_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate rates spanning twelve orders of magnitude
/// (0.000001 to 1,000,000).
fn wide_rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000_000i64).prop_map(|v| Decimal::new(v, 6))
}

/// Strategy to generate decimal places (0 to 4).
fn decimal_places() -> impl Strategy<Value = u32> {
    0u32..=4
}

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s).unwrap()
}

/// AED base plus USD, EUR, GBP at the given rates and precisions.
fn registry(rates: [Decimal; 3], places: [u32; 3]) -> CurrencyRegistry {
    CurrencyRegistry::from_currencies(
        [
            Currency::base(code("AED"), "UAE Dirham", "", 2),
            Currency::new(code("USD"), "US Dollar", "$", rates[0], places[0]),
            Currency::new(code("EUR"), "Euro", "€", rates[1], places[1]),
            Currency::new(code("GBP"), "Pound Sterling", "£", rates[2], places[2]),
        ],
        RateSettings::default(),
    )
    .unwrap()
}

fn unit(decimal_places: u32) -> Decimal {
    Decimal::new(1, decimal_places)
}

fn relative_error(expected: Decimal, actual: Decimal) -> Decimal {
    ((actual - expected) / expected).abs()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Converting A -> B -> A recovers the amount to within one unit of A
    /// plus one unit of B expressed in A.
    #[test]
    fn prop_round_trip_within_one_unit(
        rate_a in rate(),
        rate_b in rate(),
        places_a in decimal_places(),
        places_b in decimal_places(),
        minor_units in 1i64..100_000_000i64,
    ) {
        let registry = registry([rate_a, rate_b, Decimal::ONE], [places_a, places_b, 2]);
        let amount = Money::new(Decimal::new(minor_units, places_a), code("USD"));

        let there = registry.convert(&amount, code("USD"), code("EUR")).unwrap();
        let back = registry.convert(&there, code("EUR"), code("USD")).unwrap();

        let tolerance = unit(places_a) + unit(places_b) * rate_b / rate_a;
        prop_assert!(
            (back.amount - amount.amount).abs() <= tolerance,
            "{} -> {} -> {} exceeds tolerance {}",
            amount, there, back, tolerance
        );
    }

    /// Converted amounts never carry more precision than the target allows.
    #[test]
    fn prop_conversion_respects_target_precision(
        rate_a in rate(),
        rate_b in rate(),
        places_b in decimal_places(),
        cents in 1i64..100_000_000i64,
    ) {
        let registry = registry([rate_a, rate_b, Decimal::ONE], [2, places_b, 2]);
        let amount = Money::new(Decimal::new(cents, 2), code("USD"));

        let first = registry.convert(&amount, code("USD"), code("EUR")).unwrap();
        let second = registry.convert(&amount, code("USD"), code("EUR")).unwrap();

        prop_assert!(first.amount.scale() <= places_b);
        prop_assert_eq!(first, second, "Conversion should be deterministic");
    }

    /// Re-basing leaves every pairwise ratio unchanged within rounding.
    #[test]
    fn prop_rebase_preserves_cross_rates(
        rate_usd in rate(),
        rate_eur in rate(),
        rate_gbp in rate(),
    ) {
        let mut registry = registry([rate_usd, rate_eur, rate_gbp], [2, 2, 2]);
        let codes = [code("AED"), code("USD"), code("EUR"), code("GBP")];

        let before: Vec<Decimal> = codes
            .iter()
            .flat_map(|x| codes.iter().map(move |y| (*x, *y)))
            .map(|(x, y)| registry.cross_rate(x, y).unwrap())
            .collect();

        registry.set_base_currency(code("GBP")).unwrap();

        let after: Vec<Decimal> = codes
            .iter()
            .flat_map(|x| codes.iter().map(move |y| (*x, *y)))
            .map(|(x, y)| registry.cross_rate(x, y).unwrap())
            .collect();

        let tolerance = Decimal::new(1, 4);
        for (expected, actual) in before.iter().zip(&after) {
            prop_assert!(
                relative_error(*expected, *actual) <= tolerance,
                "cross rate drifted from {} to {}",
                expected, actual
            );
        }
    }

    /// After any sequence of re-basings exactly one currency is base and its
    /// rate is exactly 1; all other rates stay positive.
    #[test]
    fn prop_rebase_keeps_single_base(
        rates in prop::array::uniform3(rate()),
        targets in prop::collection::vec(0usize..4, 1..6),
    ) {
        let mut registry = registry(rates, [2, 2, 2]);
        let codes = [code("AED"), code("USD"), code("EUR"), code("GBP")];

        for target in targets {
            registry.set_base_currency(codes[target]).unwrap();

            let bases: Vec<&Currency> = registry.iter().filter(|c| c.is_base_currency).collect();
            prop_assert_eq!(bases.len(), 1);
            prop_assert_eq!(bases[0].code, codes[target]);
            prop_assert_eq!(bases[0].exchange_rate, Decimal::ONE);
            prop_assert!(registry.iter().all(|c| c.exchange_rate > Decimal::ZERO));
        }
    }

    /// A rejected rate update leaves the registry untouched.
    #[test]
    fn prop_rejected_set_rate_is_noop(
        rates in prop::array::uniform3(rate()),
        bad_rate in -1_000_000i64..=0i64,
    ) {
        let mut registry = registry(rates, [2, 2, 2]);
        let before = registry.clone();

        prop_assert!(registry.set_rate(code("USD"), Decimal::new(bad_rate, 2)).is_err());
        prop_assert!(registry.set_rate(code("AED"), rates[0]).is_err());
        prop_assert_eq!(registry, before);
    }

    /// Cross rates survive re-basing even when rates span from micro units
    /// to millions, because re-based rates keep significant digits.
    #[test]
    fn prop_rebase_preserves_wide_cross_rates(
        rates in prop::array::uniform3(wide_rate()),
        target in 0usize..4,
    ) {
        let mut registry = registry(rates, [2, 2, 2]);
        let codes = [code("AED"), code("USD"), code("EUR"), code("GBP")];
        let pairs: Vec<(CurrencyCode, CurrencyCode)> = codes
            .iter()
            .flat_map(|x| codes.iter().map(move |y| (*x, *y)))
            .collect();

        let before: Vec<Decimal> = pairs
            .iter()
            .map(|(x, y)| registry.cross_rate(*x, *y).unwrap())
            .collect();

        registry.set_base_currency(codes[target]).unwrap();

        let tolerance = Decimal::new(1, 14);
        for ((x, y), expected) in pairs.iter().zip(&before) {
            let actual = registry.cross_rate(*x, *y).unwrap();
            prop_assert!(
                relative_error(*expected, actual) <= tolerance,
                "{}/{} drifted from {} to {}",
                x, y, expected, actual
            );
        }
    }

    /// A re-basing that overflows some rate fails as a whole.
    #[test]
    fn prop_failed_rebase_leaves_registry_unchanged(
        rates in prop::array::uniform3(rate()),
        tiny in 1i64..10i64,
        huge in 1i64..10i64,
    ) {
        let mut registry = registry(rates, [2, 2, 2]);
        registry
            .add_currency(Currency::new(code("VND"), "Dong", "₫", Decimal::new(tiny, 6), 0))
            .unwrap();
        let gold = Decimal::from_i128_with_scale(i128::from(huge) * 10i128.pow(24), 0);
        registry
            .add_currency(Currency::new(code("XAU"), "Gold", "", gold, 4))
            .unwrap();
        let before = registry.clone();

        prop_assert_eq!(
            registry.set_base_currency(code("VND")),
            Err(CurrencyError::RebaseFailed { base: code("VND"), currency: code("XAU") })
        );
        prop_assert_eq!(registry, before);
    }
}
