//! Catalog commands.

use std::fmt::Write as _;

use jfk_cannabis_core::catalog::{Catalog, Potency, PotencyUnit, Product, ProductFilter};
use jfk_cannabis_core::{ProductId, format_usd};

use super::CliError;

/// Filtered, sorted product listing.
///
/// # Errors
///
/// Returns error only if JSON output fails.
pub fn list(catalog: &Catalog, filter: &ProductFilter, json: bool) -> Result<String, CliError> {
    render_list(&catalog.filter(filter), json)
}

/// Free-text search.
///
/// # Errors
///
/// Returns error only if JSON output fails.
pub fn search(catalog: &Catalog, query: &str, json: bool) -> Result<String, CliError> {
    render_list(&catalog.search(query), json)
}

/// One product with its lab summary.
///
/// # Errors
///
/// Returns `CliError::UnknownProduct` for unknown IDs.
pub fn show(catalog: &Catalog, id: i32, json: bool) -> Result<String, CliError> {
    let id = ProductId::new(id);
    let product = catalog.get(id).ok_or(CliError::UnknownProduct(id))?;
    if json {
        return Ok(serde_json::to_string_pretty(product)?);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", product.name, product.brand);
    let _ = writeln!(out, "{}", summary_line(product));
    if !product.description.is_empty() {
        let _ = writeln!(out, "\n{}", product.description);
    }
    if !product.effects.is_empty() {
        let _ = writeln!(out, "Effects: {}", product.effects.join(", "));
    }
    if !product.weights.is_empty() {
        let _ = writeln!(out, "Weights: {}", product.weights.join(", "));
    }
    if !product.sizes.is_empty() {
        let _ = writeln!(out, "Sizes: {}", product.sizes.join(", "));
    }
    if let Some(report) = &product.lab_report {
        let _ = writeln!(
            out,
            "Lab: {} ({}, batch {}), total cannabinoids {}%, contaminants {}",
            report.lab_name,
            report.tested_at,
            report.batch_number,
            report.total_cannabinoids(),
            if report.passed_all_contaminants() {
                "passed"
            } else {
                "FAILED"
            },
        );
        let labels = report.entourage_labels();
        if !labels.is_empty() {
            let _ = writeln!(out, "Terpene profile: {}", labels.join(", "));
        }
    }
    Ok(out.trim_end().to_string())
}

fn render_list(products: &[&Product], json: bool) -> Result<String, CliError> {
    if json {
        return Ok(serde_json::to_string_pretty(products)?);
    }
    if products.is_empty() {
        return Ok("No products found.".to_string());
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:>3}  {:<32} {:<24} {}",
            product.id,
            product.name,
            product.brand,
            summary_line(product)
        );
    }
    let _ = write!(out, "{} product(s)", products.len());
    Ok(out)
}

fn summary_line(product: &Product) -> String {
    let mut line = format!("{} ", product.category);
    match product.discount_percent() {
        Some(percent) if product.is_on_sale() => {
            let _ = write!(
                line,
                "{} (was {}, {percent}% off)",
                format_usd(product.effective_price()),
                format_usd(product.price)
            );
        }
        _ => line.push_str(&format_usd(product.price)),
    }
    if let Some(thc) = product.thc {
        let _ = write!(line, " THC {}", potency(thc));
    }
    if !product.in_stock {
        line.push_str(" [out of stock]");
    }
    line
}

fn potency(potency: Potency) -> String {
    match potency.unit {
        PotencyUnit::Percent => format!("{}%", potency.value),
        PotencyUnit::Mg => format!("{}mg", potency.value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jfk_cannabis_core::catalog::Category;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_fixtures().unwrap()
    }

    #[test]
    fn test_list_filters_by_category() {
        let filter = ProductFilter {
            category: Some(Category::Vapes),
            ..ProductFilter::default()
        };
        let out = list(&catalog(), &filter, false).unwrap();
        assert!(out.contains("Pineapple Express Cartridge"));
        assert!(out.contains("Granddaddy Purple Disposable"));
        assert!(!out.contains("Blue Dream"));
        assert!(out.ends_with("2 product(s)"));
    }

    #[test]
    fn test_list_marks_sales_and_stock() {
        let out = list(&catalog(), &ProductFilter::default(), false).unwrap();
        assert!(out.contains("$38.00 (was $45.00"));
        assert!(out.contains("[out of stock]"));
    }

    #[test]
    fn test_search_no_results() {
        let out = search(&catalog(), "nothing matches this", false).unwrap();
        assert_eq!(out, "No products found.");
    }

    #[test]
    fn test_search_json_is_an_array() {
        let out = search(&catalog(), "blue dream", true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["id"], 3);
    }

    #[test]
    fn test_show_includes_lab_summary() {
        let out = show(&catalog(), 1, false).unwrap();
        assert!(out.starts_with("Gelato Cake - Hudson Valley Growers"));
        assert!(out.contains("Lab: "));
        assert!(out.contains("Weights: 3.5g, 7g"));
    }

    #[test]
    fn test_show_unknown_product() {
        let err = show(&catalog(), 999, false).unwrap_err();
        assert!(matches!(err, CliError::UnknownProduct(id) if id.as_i32() == 999));
    }
}
