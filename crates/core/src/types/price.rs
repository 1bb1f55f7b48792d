//! Money helpers using decimal arithmetic.
//!
//! All amounts are US dollars held as [`Decimal`] in the currency's standard
//! unit (dollars, not cents). Derived amounts (tax, totals) are rounded to
//! cents with half-away-from-zero rounding, the rule register receipts use.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to whole cents.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display (e.g., "$67.15").
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${:.2}", rounded.abs())
    } else {
        format!("${rounded:.2}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_round_cents_half_away_from_zero() {
        assert_eq!(round_cents(dec!(7.145)), dec!(7.15));
        assert_eq!(round_cents(dec!(7.144)), dec!(7.14));
        assert_eq!(round_cents(dec!(0.005)), dec!(0.01));
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(67.15)), "$67.15");
        assert_eq!(format_usd(dec!(5)), "$5.00");
        assert_eq!(format_usd(dec!(-3.5)), "-$3.50");
    }
}
