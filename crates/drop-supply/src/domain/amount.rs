//! # Amounts
//!
//! Fixed-point helpers for ledger balances. Balances arrive as decimal
//! strings, either plain (`"-500000.25"`) or in the mantissa/exponent form
//! rippled uses for large and tiny values (`"1000000000000000e-4"`).
//! Everything stays in [`Decimal`]; no floating point is involved.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Largest fractional precision accepted for published figures.
pub const MAX_DECIMALS: u32 = 18;

/// Largest scale a [`Decimal`] can carry.
const MAX_SCALE: i64 = 28;

/// Parse a ledger balance string into a signed decimal.
///
/// Values finer than 28 fractional digits are rounded half away from zero,
/// so a dust balance such as `"1e-90"` reads as zero. Returns `None` for
/// empty or non-numeric input and for magnitudes beyond `Decimal`'s range.
pub fn parse_balance(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => parse_scientific(mantissa, exponent),
        None => Decimal::from_str(raw).ok(),
    }
}

/// `mantissa * 10^exponent`, rescaled into `Decimal`'s 28-digit window.
fn parse_scientific(mantissa: &str, exponent: &str) -> Option<Decimal> {
    let mantissa = Decimal::from_str(mantissa).ok()?;
    let exponent: i64 = exponent.strip_prefix('+').unwrap_or(exponent).parse().ok()?;

    let digits = mantissa.mantissa();
    let scale = i64::from(mantissa.scale()).checked_sub(exponent)?;

    if scale < 0 {
        let factor = 10i128.checked_pow(u32::try_from(-scale).ok()?)?;
        return Decimal::try_from_i128_with_scale(digits.checked_mul(factor)?, 0).ok();
    }
    if scale <= MAX_SCALE {
        return Decimal::try_from_i128_with_scale(digits, u32::try_from(scale).ok()?).ok();
    }

    // Drop the digits past the 28th fractional place. A mantissa has at
    // most 29 digits, so a shift of 30 or more always rounds to zero.
    let shift = scale - MAX_SCALE;
    if shift >= 30 {
        return Some(Decimal::ZERO);
    }
    let divisor = 10i128.pow(u32::try_from(shift).ok()?);
    let mut quotient = digits / divisor;
    let remainder = digits % divisor;
    if remainder.abs() * 2 >= divisor {
        quotient += digits.signum();
    }
    Decimal::try_from_i128_with_scale(quotient, MAX_SCALE as u32).ok()
}

/// Round `value` to `decimals` fractional digits, half away from zero.
pub fn round_fixed(value: Decimal, decimals: u32) -> Decimal {
    value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Render `value` with exactly `decimals` fractional digits.
///
/// Rounds half away from zero and never emits a negative zero.
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded = round_fixed(value, decimals);
    rounded.rescale(decimals);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain_balances() {
        assert_eq!(parse_balance("-500000"), Some(dec("-500000")));
        assert_eq!(parse_balance("1.5"), Some(dec("1.5")));
        assert_eq!(parse_balance(" 0 "), Some(Decimal::ZERO));
    }

    #[test]
    fn test_parse_scientific_balances() {
        assert_eq!(parse_balance("1000000000000000e-4"), Some(dec("100000000000")));
        assert_eq!(parse_balance("-25e-1"), Some(dec("-2.5")));
    }

    #[test]
    fn test_parse_dust_rounds_toward_zero() {
        assert_eq!(parse_balance("-1e-30"), Some(Decimal::ZERO));
        assert_eq!(parse_balance("-4.2e-50"), Some(Decimal::ZERO));
        assert_eq!(parse_balance("-1000000000000000e-96"), Some(Decimal::ZERO));
        assert_eq!(parse_balance("1e-81"), Some(Decimal::ZERO));
        assert_eq!(parse_balance("5e-29"), Some(dec("0.0000000000000000000000000001")));
        assert_eq!(parse_balance("-15e-29"), Some(dec("-0.0000000000000000000000000002")));
    }

    #[test]
    fn test_parse_large_exponents() {
        assert_eq!(parse_balance("1e+6"), Some(dec("1000000")));
        assert_eq!(parse_balance("12E3"), Some(dec("12000")));
        assert_eq!(parse_balance("9999999999999999e80"), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_balance(""), None);
        assert_eq!(parse_balance("abc"), None);
        assert_eq!(parse_balance("1.2.3"), None);
        assert_eq!(parse_balance("NaN"), None);
        assert_eq!(parse_balance("e5"), None);
        assert_eq!(parse_balance("1e"), None);
        assert_eq!(parse_balance("1e2e3"), None);
    }

    #[test]
    fn test_format_pads_to_precision() {
        assert_eq!(format_fixed(dec("500001.5"), 6), "500001.500000");
        assert_eq!(format_fixed(Decimal::ZERO, 6), "0.000000");
        assert_eq!(format_fixed(dec("1000000"), 6), "1000000.000000");
    }

    #[test]
    fn test_format_rounds_half_away_from_zero() {
        assert_eq!(format_fixed(dec("0.0000005"), 6), "0.000001");
        assert_eq!(format_fixed(dec("0.0000004"), 6), "0.000000");
        assert_eq!(format_fixed(dec("-1.2345675"), 6), "-1.234568");
    }

    #[test]
    fn test_format_never_emits_negative_zero() {
        assert_eq!(format_fixed(dec("-0.0000001"), 6), "0.000000");
    }

    proptest! {
        #[test]
        fn prop_scientific_matches_scaled_mantissa(
            mantissa in -9_999_999_999_999_999i64..=9_999_999_999_999_999,
            exponent in -28i32..=0,
        ) {
            let parsed = parse_balance(&format!("{mantissa}e{exponent}")).unwrap();
            let expected = Decimal::from_i128_with_scale(i128::from(mantissa), exponent.unsigned_abs());
            prop_assert_eq!(parsed, expected);
        }

        #[test]
        fn prop_dust_exponents_read_as_zero(
            mantissa in -9_999_999_999_999_999i64..=9_999_999_999_999_999,
            exponent in -96i32..=-46,
        ) {
            prop_assert_eq!(parse_balance(&format!("{mantissa}e{exponent}")), Some(Decimal::ZERO));
        }
    }
}
