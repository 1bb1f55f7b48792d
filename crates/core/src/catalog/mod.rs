//! The dispensary menu.
//!
//! A [`Catalog`] is an owned, immutable list of [`Product`]s with the lookup,
//! filter, search and sort helpers the storefront and back office need. The
//! default menu ships as an embedded JSON fixture.

mod product;

pub use product::{Category, Potency, PotencyUnit, Product, StrainType};

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Embedded menu fixture.
const PRODUCTS_FIXTURE: &str = include_str!("../../fixtures/products.json");

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Featured products first, otherwise menu order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Name,
    ThcDesc,
}

/// Filter criteria for product listings.
///
/// Every `None` / `false` field matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub brand: Option<String>,
    pub strain_type: Option<StrainType>,
    /// Inclusive lower bound on the effective price.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on the effective price.
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub on_sale_only: bool,
    /// Free-text search, same semantics as [`Catalog::search`].
    #[serde(rename = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ProductFilter {
    fn matches(&self, product: &Product, needle: Option<&str>) -> bool {
        let price = product.effective_price();
        self.category.is_none_or(|c| product.category == c)
            && self.subcategory.as_deref().is_none_or(|s| {
                product
                    .subcategory
                    .as_deref()
                    .is_some_and(|own| own.eq_ignore_ascii_case(s))
            })
            && self
                .brand
                .as_deref()
                .is_none_or(|b| product.brand.eq_ignore_ascii_case(b))
            && self
                .strain_type
                .is_none_or(|t| product.strain_type == Some(t))
            && self.min_price.is_none_or(|min| price >= min)
            && self.max_price.is_none_or(|max| price <= max)
            && (!self.in_stock_only || product.in_stock)
            && (!self.on_sale_only || product.is_on_sale())
            && needle.is_none_or(|n| product.matches_query(n))
    }
}

/// The product menu.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from a list of products, keeping their order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Load the embedded menu fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture JSON does not match [`Product`].
    pub fn from_fixtures() -> Result<Self, serde_json::Error> {
        Self::from_json(PRODUCTS_FIXTURE)
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match [`Product`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// All products in menu order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    /// Number of products on the menu.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the menu is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products in `category`, optionally narrowed to an exact `subcategory`.
    #[must_use]
    pub fn products_by_category(
        &self,
        category: Category,
        subcategory: Option<&str>,
    ) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == category)
            .filter(|p| subcategory.is_none_or(|s| p.subcategory.as_deref() == Some(s)))
            .collect()
    }

    /// Case-insensitive substring search across name, brand, description and effects.
    ///
    /// A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.products
            .iter()
            .filter(|p| p.matches_query(&needle))
            .collect()
    }

    /// Products flagged as featured, in menu order, at most `limit`.
    #[must_use]
    pub fn featured_products(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.featured)
            .take(limit)
            .collect()
    }

    /// Products whose sale price is below their list price.
    #[must_use]
    pub fn sale_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.is_on_sale()).collect()
    }

    /// Distinct brand names, sorted.
    #[must_use]
    pub fn brands(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(|p| p.brand.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Up to `limit` products to show alongside product `id`.
    ///
    /// Candidates are tiered: same category, then shared effects, then
    /// anything else. Each tier is shuffled with `rng` so merchandising
    /// rotates, but the tiers keep their priority. The product itself is
    /// never included; an unknown `id` yields nothing.
    pub fn related_products<R: Rng + ?Sized>(
        &self,
        id: ProductId,
        limit: usize,
        rng: &mut R,
    ) -> Vec<&Product> {
        let Some(target) = self.get(id) else {
            return Vec::new();
        };

        let mut same_category = Vec::new();
        let mut shared_effect = Vec::new();
        let mut rest = Vec::new();

        for product in self.products.iter().filter(|p| p.id != id) {
            if product.category == target.category {
                same_category.push(product);
            } else if product.shares_effect_with(target) {
                shared_effect.push(product);
            } else {
                rest.push(product);
            }
        }

        same_category.shuffle(rng);
        shared_effect.shuffle(rng);
        rest.shuffle(rng);

        same_category
            .into_iter()
            .chain(shared_effect)
            .chain(rest)
            .take(limit)
            .collect()
    }

    /// Apply `filter` and its sort order.
    #[must_use]
    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        let needle = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| filter.matches(p, needle.as_deref()))
            .collect();

        sort_products(&mut matches, filter.sort);
        matches
    }
}

/// Sort products in place. Sorting is stable, so ties keep menu order.
pub fn sort_products(products: &mut [&Product], order: SortOrder) {
    match order {
        SortOrder::Featured => products.sort_by_key(|p| !p.featured),
        SortOrder::PriceAsc => products.sort_by_key(|p| p.effective_price()),
        SortOrder::PriceDesc => {
            products.sort_by(|a, b| b.effective_price().cmp(&a.effective_price()));
        }
        SortOrder::Name => products.sort_by_cached_key(|p| p.name.to_lowercase()),
        SortOrder::ThcDesc => products.sort_by(|a, b| b.thc_value().cmp(&a.thc_value())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_fixtures().unwrap()
    }

    #[test]
    fn test_fixture_loads_with_unique_ids() {
        let catalog = catalog();
        assert!(catalog.len() >= 12);
        let ids: BTreeSet<_> = catalog.all().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_products_by_category_exact_match() {
        let catalog = catalog();
        let flower = catalog.products_by_category(Category::Flower, None);
        assert!(!flower.is_empty());
        assert!(flower.iter().all(|p| p.category == Category::Flower));

        let gummies = catalog.products_by_category(Category::Edibles, Some("gummies"));
        assert!(!gummies.is_empty());
        assert!(
            gummies
                .iter()
                .all(|p| p.subcategory.as_deref() == Some("gummies"))
        );
        assert!(
            catalog
                .products_by_category(Category::Edibles, Some("Gummies"))
                .is_empty()
        );
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let catalog = catalog();
        let by_name = catalog.search("BLUE DREAM");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, ProductId::new(3));

        let by_effect = catalog.search("sleepy");
        assert!(
            by_effect
                .iter()
                .all(|p| p.effects.iter().any(|e| e.eq_ignore_ascii_case("sleepy")))
        );
        assert!(!by_effect.is_empty());

        assert!(catalog.search("   ").is_empty());
        assert!(catalog.search("no-such-product").is_empty());
    }

    #[test]
    fn test_sale_products_only_discounted() {
        let catalog = catalog();
        let sale = catalog.sale_products();
        assert!(!sale.is_empty());
        for product in sale {
            assert!(product.sale_price.unwrap() < product.price);
        }
        // Fixture product 9 has a sale price equal to its list price.
        assert!(!catalog.sale_products().iter().any(|p| p.id == ProductId::new(9)));
    }

    #[test]
    fn test_featured_products_respects_limit() {
        let catalog = catalog();
        let featured = catalog.featured_products(2);
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|p| p.featured));
        assert!(catalog.featured_products(0).is_empty());
    }

    #[test]
    fn test_related_products_tiers_and_determinism() {
        let catalog = catalog();
        let target = catalog.get(ProductId::new(3)).unwrap();
        let same_category = catalog
            .products_by_category(target.category, None)
            .len()
            - 1;

        let mut rng = StdRng::seed_from_u64(7);
        let related = catalog.related_products(target.id, 20, &mut rng);
        assert!(related.iter().all(|p| p.id != target.id));
        assert_eq!(related.len(), catalog.len() - 1);
        assert!(
            related
                .iter()
                .take(same_category)
                .all(|p| p.category == target.category)
        );

        let first = catalog.related_products(target.id, 4, &mut StdRng::seed_from_u64(42));
        let second = catalog.related_products(target.id, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(first.len(), 4);
        assert_eq!(
            first.iter().map(|p| p.id).collect::<Vec<_>>(),
            second.iter().map(|p| p.id).collect::<Vec<_>>()
        );

        assert!(
            catalog
                .related_products(ProductId::new(9999), 4, &mut rng)
                .is_empty()
        );
    }

    #[test]
    fn test_filter_price_range_and_sort() {
        let catalog = catalog();
        let filter = ProductFilter {
            min_price: Some(dec!(20)),
            max_price: Some(dec!(50)),
            sort: SortOrder::PriceAsc,
            ..ProductFilter::default()
        };
        let results = catalog.filter(&filter);
        assert!(!results.is_empty());
        let prices: Vec<_> = results.iter().map(|p| p.effective_price()).collect();
        assert!(prices.windows(2).all(|w| w[0] <= w[1]));
        assert!(prices.iter().all(|p| *p >= dec!(20) && *p <= dec!(50)));
    }

    #[test]
    fn test_filter_in_stock_and_sale() {
        let catalog = catalog();
        let filter = ProductFilter {
            in_stock_only: true,
            on_sale_only: true,
            ..ProductFilter::default()
        };
        let results = catalog.filter(&filter);
        assert!(results.iter().all(|p| p.in_stock && p.is_on_sale()));

        let featured_first = catalog.filter(&ProductFilter::default());
        let first_plain = featured_first.iter().position(|p| !p.featured).unwrap();
        assert!(featured_first[first_plain..].iter().all(|p| !p.featured));
    }

    #[test]
    fn test_brands_sorted_unique() {
        let catalog = catalog();
        let brands = catalog.brands();
        let mut sorted = brands.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(brands, sorted);
    }
}
