//! Product records as they appear in the dispensary menu.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lab::LabReport;
use crate::pricing::discount_percent;
use crate::types::ProductId;

/// Top-level menu category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Flower,
    PreRolls,
    Vapes,
    Edibles,
    Concentrates,
    Tinctures,
    Topicals,
    Accessories,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Self; 8] = [
        Self::Flower,
        Self::PreRolls,
        Self::Vapes,
        Self::Edibles,
        Self::Concentrates,
        Self::Tinctures,
        Self::Topicals,
        Self::Accessories,
    ];

    /// URL slug for this category.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Flower => "flower",
            Self::PreRolls => "pre_rolls",
            Self::Vapes => "vapes",
            Self::Edibles => "edibles",
            Self::Concentrates => "concentrates",
            Self::Tinctures => "tinctures",
            Self::Topicals => "topicals",
            Self::Accessories => "accessories",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == normalized)
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

/// Cannabis strain classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrainType {
    Indica,
    Sativa,
    Hybrid,
    Cbd,
}

/// Unit a potency figure is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotencyUnit {
    /// Percent by weight (flower, concentrates).
    Percent,
    /// Milligrams per package (edibles, tinctures).
    Mg,
}

/// A THC or CBD potency figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potency {
    pub value: Decimal,
    pub unit: PotencyUnit,
}

/// A product on the menu.
///
/// Products are immutable reference data; carts hold their own copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: Category,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    pub in_stock: bool,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub thc: Option<Potency>,
    #[serde(default)]
    pub cbd: Option<Potency>,
    #[serde(default)]
    pub strain_type: Option<StrainType>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    /// Selectable weights (e.g. "3.5g", "7g"). Empty when not applicable.
    #[serde(default)]
    pub weights: Vec<String>,
    /// Selectable sizes (e.g. "0.5g cart", "1g cart"). Empty when not applicable.
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub lab_report: Option<LabReport>,
}

impl Product {
    /// Whether the sale price is strictly below the list price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some_and(|sale| sale < self.price)
    }

    /// Price a customer pays per unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale < self.price => sale,
            _ => self.price,
        }
    }

    /// Percentage-off badge, when on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.sale_price
            .and_then(|sale| discount_percent(self.price, sale))
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock
    }

    /// Case-insensitive substring match across name, brand, description and effects.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.brand.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self
                .effects
                .iter()
                .any(|effect| effect.to_lowercase().contains(needle))
    }

    /// Whether this product shares at least one effect with `other`.
    #[must_use]
    pub fn shares_effect_with(&self, other: &Self) -> bool {
        self.effects.iter().any(|effect| {
            other
                .effects
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(effect))
        })
    }

    /// THC potency as a sortable number, 0 when unknown.
    #[must_use]
    pub fn thc_value(&self) -> Decimal {
        self.thc.map_or(Decimal::ZERO, |potency| potency.value)
    }
}
