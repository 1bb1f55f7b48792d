//! Pricing rules: state tax table, delivery fee tiers and sale discounts.
//!
//! These are pure functions over static tables. Every cart and checkout total
//! in the system is derived through this module.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::round_cents;

/// Tax rate applied when the state is not in [`TAX_RATES`] (13%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 2);

/// Adult-use cannabis tax rates by state code.
pub const TAX_RATES: [(&str, Decimal); 4] = [
    ("NY", Decimal::from_parts(13, 0, 0, false, 2)),
    ("NJ", Decimal::from_parts(6625, 0, 0, false, 5)),
    ("MA", Decimal::from_parts(1075, 0, 0, false, 4)),
    ("CT", Decimal::from_parts(635, 0, 0, false, 4)),
];

/// Subtotal at or above which delivery is free.
pub const FREE_DELIVERY_THRESHOLD: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Delivery fee for destinations within 5 miles.
pub const LOCAL_DELIVERY_FEE: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Delivery fee for destinations within 10 miles.
pub const NEARBY_DELIVERY_FEE: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Delivery fee for destinations beyond 10 miles.
pub const DISTANT_DELIVERY_FEE: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Where an order is going, as far as pricing is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// Two-letter state code used for the tax lookup.
    pub state: String,
    /// Driving distance from the store in miles.
    pub distance_miles: f64,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            state: "NY".to_string(),
            distance_miles: 0.0,
        }
    }
}

/// Look up the tax rate for a state code (case-insensitive).
#[must_use]
pub fn tax_rate(state: &str) -> Decimal {
    let state = state.trim();
    TAX_RATES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(state))
        .map_or(DEFAULT_TAX_RATE, |(_, rate)| *rate)
}

/// Tax owed on `subtotal` for `state`, rounded to cents.
///
/// Unknown states fall back to [`DEFAULT_TAX_RATE`].
#[must_use]
pub fn calculate_tax(subtotal: Decimal, state: &str) -> Decimal {
    round_cents(subtotal * tax_rate(state))
}

/// Delivery fee for an order of `subtotal` travelling `distance_miles`.
#[must_use]
pub fn calculate_delivery_fee(subtotal: Decimal, distance_miles: f64) -> Decimal {
    if subtotal >= FREE_DELIVERY_THRESHOLD {
        Decimal::ZERO
    } else if distance_miles <= 5.0 {
        LOCAL_DELIVERY_FEE
    } else if distance_miles <= 10.0 {
        NEARBY_DELIVERY_FEE
    } else {
        DISTANT_DELIVERY_FEE
    }
}

/// Whole-percent discount shown on the sale badge.
///
/// Returns `None` unless `sale_price` is strictly below a positive `price`.
/// Halves round up, so 12.5% off shows as 13%.
#[must_use]
pub fn discount_percent(price: Decimal, sale_price: Decimal) -> Option<u32> {
    if price <= Decimal::ZERO || sale_price >= price {
        return None;
    }
    let percent = (price - sale_price) / price * Decimal::ONE_HUNDRED;
    percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

/// Derived totals for a set of cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl PriceSummary {
    /// Compute totals for `subtotal` shipped to `destination`.
    ///
    /// When `waive_delivery` is set (store pickup) the delivery fee is zero.
    #[must_use]
    pub fn compute(subtotal: Decimal, destination: &Destination, waive_delivery: bool) -> Self {
        let subtotal = round_cents(subtotal);
        let tax = calculate_tax(subtotal, &destination.state);
        let delivery_fee = if waive_delivery || subtotal.is_zero() {
            Decimal::ZERO
        } else {
            calculate_delivery_fee(subtotal, destination.distance_miles)
        };

        Self {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_tax_known_and_unknown_states() {
        assert_eq!(calculate_tax(dec!(100), "NY"), dec!(13));
        assert_eq!(calculate_tax(dec!(100), "ZZ"), dec!(13));
        assert_eq!(calculate_tax(dec!(100), "nj"), dec!(6.63));
        assert_eq!(calculate_tax(dec!(100), "MA"), dec!(10.75));
        assert_eq!(calculate_tax(dec!(55), "NY"), dec!(7.15));
    }

    #[test]
    fn test_free_delivery_at_threshold_for_any_distance() {
        for distance in [0.0, 4.9, 5.0, 9.99, 10.0, 25.0, 500.0] {
            assert_eq!(calculate_delivery_fee(dec!(60), distance), Decimal::ZERO);
            assert_eq!(calculate_delivery_fee(dec!(250.50), distance), Decimal::ZERO);
        }
    }

    #[test]
    fn test_delivery_fee_tiers_under_threshold() {
        assert_eq!(calculate_delivery_fee(dec!(59.99), 0.0), dec!(5));
        assert_eq!(calculate_delivery_fee(dec!(59.99), 5.0), dec!(5));
        assert_eq!(calculate_delivery_fee(dec!(20), 5.01), dec!(8));
        assert_eq!(calculate_delivery_fee(dec!(20), 10.0), dec!(8));
        assert_eq!(calculate_delivery_fee(dec!(20), 10.5), dec!(12));
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(discount_percent(dec!(40), dec!(30)), Some(25));
        assert_eq!(discount_percent(dec!(40), dec!(35)), Some(13));
        assert_eq!(discount_percent(dec!(30), dec!(20)), Some(33));
        assert_eq!(discount_percent(dec!(40), dec!(40)), None);
        assert_eq!(discount_percent(dec!(40), dec!(45)), None);
        assert_eq!(discount_percent(Decimal::ZERO, Decimal::ZERO), None);
    }

    #[test]
    fn test_summary_for_single_item_under_threshold() {
        let summary = PriceSummary::compute(dec!(55), &Destination::default(), false);
        assert_eq!(summary.subtotal, dec!(55));
        assert_eq!(summary.delivery_fee, dec!(5));
        assert_eq!(summary.tax, dec!(7.15));
        assert_eq!(summary.total, dec!(67.15));
    }

    #[test]
    fn test_summary_pickup_and_empty() {
        let pickup = PriceSummary::compute(dec!(55), &Destination::default(), true);
        assert_eq!(pickup.delivery_fee, Decimal::ZERO);
        assert_eq!(pickup.total, dec!(62.15));

        let empty = PriceSummary::compute(Decimal::ZERO, &Destination::default(), false);
        assert_eq!(empty.total, Decimal::ZERO);
    }
}
