//! Certificate-of-analysis data attached to tested products.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Terpene keywords and the effect label each one triggers on the product page.
const TERPENE_LABELS: [(&str, &str); 7] = [
    ("myrcene", "relaxing"),
    ("limonene", "uplifting"),
    ("pinene", "focus"),
    ("linalool", "calming"),
    ("caryophyllene", "soothing"),
    ("terpinolene", "energizing"),
    ("humulene", "appetite-suppressing"),
];

/// Outcome of a single contaminant screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContaminantResult {
    /// Reported result, e.g. "ND" or "< 10 CFU/g".
    pub result: String,
    pub passed: bool,
}

/// A lab report for one product batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabReport {
    pub lab_name: String,
    pub tested_at: NaiveDate,
    pub batch_number: String,
    /// Cannabinoid name to percent by weight.
    #[serde(default)]
    pub cannabinoids: BTreeMap<String, Decimal>,
    /// Terpene name to percent by weight.
    #[serde(default)]
    pub terpenes: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub contaminants: BTreeMap<String, ContaminantResult>,
}

impl LabReport {
    /// Sum of all reported cannabinoids.
    #[must_use]
    pub fn total_cannabinoids(&self) -> Decimal {
        self.cannabinoids.values().copied().sum()
    }

    /// Whether every contaminant screen passed. Vacuously true with no screens.
    #[must_use]
    pub fn passed_all_contaminants(&self) -> bool {
        self.contaminants.values().all(|screen| screen.passed)
    }

    /// Entourage-effect labels triggered by the report's terpenes.
    ///
    /// Labels follow terpene concentration, highest first, without repeats.
    #[must_use]
    pub fn entourage_labels(&self) -> Vec<&'static str> {
        let mut terpenes: Vec<(&String, &Decimal)> = self.terpenes.iter().collect();
        terpenes.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        let mut labels = Vec::new();
        for (name, _) in terpenes {
            let name = name.to_lowercase();
            for (keyword, label) in TERPENE_LABELS {
                if name.contains(keyword) && !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
        labels
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn report() -> LabReport {
        LabReport {
            lab_name: "Empire Analytics".to_string(),
            tested_at: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            batch_number: "BD-0424".to_string(),
            cannabinoids: BTreeMap::from([
                ("THCa".to_string(), dec!(24.1)),
                ("CBG".to_string(), dec!(0.9)),
            ]),
            terpenes: BTreeMap::from([
                ("beta-Caryophyllene".to_string(), dec!(0.41)),
                ("beta-Myrcene".to_string(), dec!(0.88)),
                ("alpha-Pinene".to_string(), dec!(0.12)),
                ("Ocimene".to_string(), dec!(0.30)),
            ]),
            contaminants: BTreeMap::from([(
                "Pesticides".to_string(),
                ContaminantResult {
                    result: "ND".to_string(),
                    passed: true,
                },
            )]),
        }
    }

    #[test]
    fn test_entourage_labels_follow_concentration() {
        assert_eq!(
            report().entourage_labels(),
            vec!["relaxing", "soothing", "focus"]
        );
    }

    #[test]
    fn test_totals_and_contaminants() {
        let mut report = report();
        assert_eq!(report.total_cannabinoids(), dec!(25.0));
        assert!(report.passed_all_contaminants());

        report.contaminants.insert(
            "Mold".to_string(),
            ContaminantResult {
                result: "120 CFU/g".to_string(),
                passed: false,
            },
        );
        assert!(!report.passed_all_contaminants());
    }
}
