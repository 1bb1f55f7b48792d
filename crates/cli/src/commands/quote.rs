//! Cart quote command.

use std::fmt::Write as _;

use serde::Serialize;

use jfk_cannabis_core::cart::{AddItemOptions, Cart};
use jfk_cannabis_core::catalog::Catalog;
use jfk_cannabis_core::pricing::{Destination, PriceSummary};
use jfk_cannabis_core::{ProductId, format_usd};

use super::CliError;

/// One `ID[xQTY][@OPTION]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Weight or size, depending on what the product offers.
    pub option: Option<String>,
}

impl std::str::FromStr for ItemSpec {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidItem(s.to_string());

        let (head, option) = match s.split_once('@') {
            Some((head, option)) if !option.is_empty() => (head, Some(option.to_string())),
            Some(_) => return Err(invalid()),
            None => (s, None),
        };
        let (id, quantity) = match head.split_once(['x', 'X']) {
            Some((id, qty)) => (id, qty.parse::<u32>().map_err(|_| invalid())?),
            None => (head, 1),
        };
        if quantity == 0 {
            return Err(invalid());
        }

        Ok(Self {
            product_id: id.trim().parse().map_err(|_| invalid())?,
            quantity,
            option,
        })
    }
}

#[derive(Serialize)]
struct QuoteOutput<'a> {
    items: &'a [jfk_cannabis_core::cart::CartItem],
    destination: &'a Destination,
    #[serde(flatten)]
    summary: PriceSummary,
}

/// Build a cart from item specs.
///
/// # Errors
///
/// Returns error for malformed specs, unknown products, out-of-stock
/// products and options the product does not offer.
pub fn build_cart(
    catalog: &Catalog,
    items: &[String],
    destination: Destination,
) -> Result<Cart, CliError> {
    let mut cart = Cart::new();
    cart.set_destination(destination);

    for raw in items {
        let wanted: ItemSpec = raw.parse()?;
        let product = catalog
            .get(wanted.product_id)
            .ok_or(CliError::UnknownProduct(wanted.product_id))?;
        let (weight, size) = match wanted.option {
            Some(option) if product.weights.is_empty() && !product.sizes.is_empty() => {
                (None, Some(option))
            }
            option => (option, None),
        };
        cart.add_item(
            product,
            AddItemOptions {
                weight,
                size,
                quantity: Some(wanted.quantity),
            },
        )?;
    }
    Ok(cart)
}

/// Price a set of items for a destination.
///
/// # Errors
///
/// See [`build_cart`].
pub fn run(
    catalog: &Catalog,
    items: &[String],
    destination: Destination,
    pickup: bool,
    json: bool,
) -> Result<String, CliError> {
    let cart = build_cart(catalog, items, destination)?;
    let summary = cart.summary(pickup);

    if json {
        return Ok(serde_json::to_string_pretty(&QuoteOutput {
            items: cart.items(),
            destination: cart.destination(),
            summary,
        })?);
    }

    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:>3} x {:<40} {:>10}",
            item.cart_quantity,
            item.product.name,
            format_usd(item.line_total())
        );
    }
    let _ = writeln!(out, "{:<46} {:>10}", "Subtotal", format_usd(summary.subtotal));
    let _ = writeln!(
        out,
        "{:<46} {:>10}",
        format!("Tax ({})", cart.destination().state),
        format_usd(summary.tax)
    );
    let delivery_label = if pickup { "Pickup" } else { "Delivery" };
    let _ = writeln!(out, "{delivery_label:<46} {:>10}", format_usd(summary.delivery_fee));
    let _ = write!(out, "{:<46} {:>10}", "Total", format_usd(summary.total));
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_fixtures().unwrap()
    }

    fn items(specs: &[&str]) -> Vec<String> {
        specs.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_item_spec_parsing() {
        let parsed: ItemSpec = "3x2@7g".parse().unwrap();
        assert_eq!(parsed.product_id, ProductId::new(3));
        assert_eq!(parsed.quantity, 2);
        assert_eq!(parsed.option.as_deref(), Some("7g"));

        let parsed: ItemSpec = "12".parse().unwrap();
        assert_eq!(parsed.quantity, 1);
        assert_eq!(parsed.option, None);

        for bad in ["", "abc", "3x0", "3x", "3@", "x2"] {
            assert!(bad.parse::<ItemSpec>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_single_item_quote() {
        let cart = build_cart(&catalog(), &items(&["3"]), Destination::default()).unwrap();
        let summary = cart.summary(false);
        assert_eq!(summary.subtotal, dec!(55));
        assert_eq!(summary.delivery_fee, dec!(5));
        assert_eq!(summary.tax, dec!(7.15));
        assert_eq!(summary.total, dec!(67.15));
    }

    #[test]
    fn test_repeated_items_merge() {
        let cart = build_cart(&catalog(), &items(&["3", "3"]), Destination::default()).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_option_routes_to_size_for_vapes() {
        let cart = build_cart(&catalog(), &items(&["6@1g"]), Destination::default()).unwrap();
        assert_eq!(cart.items()[0].selected_size.as_deref(), Some("1g"));
    }

    #[test]
    fn test_out_of_stock_rejected() {
        let err = build_cart(&catalog(), &items(&["5"]), Destination::default()).unwrap_err();
        assert!(matches!(err, CliError::Cart(_)));
    }

    #[test]
    fn test_pickup_text_output() {
        let out = run(
            &catalog(),
            &items(&["3"]),
            Destination::default(),
            true,
            false,
        )
        .unwrap();
        assert!(out.contains("Pickup"));
        assert!(out.ends_with("$62.15"));
    }
}
