//! Checkout form validation and the checkout status machine.
//!
//! Validation is pure: it looks at the cart, the submitted form and whether
//! the customer's ID has been verified, and reports every problem at once so
//! the page can show them together.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::pricing::PriceSummary;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    #[default]
    Delivery,
    Pickup,
}

impl DeliveryMethod {
    /// Whether a street address is required.
    #[must_use]
    pub const fn requires_address(self) -> bool {
        matches!(self, Self::Delivery)
    }
}

/// Payment collected on delivery or at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Debit,
}

/// Submitted checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Client-chosen key so a retried submit returns the original order.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// A single reason the checkout cannot proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssue {
    EmptyCart,
    MissingAddress,
    IdNotVerified,
    TermsNotAccepted,
}

impl ValidationIssue {
    /// Customer-facing message.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty",
            Self::MissingAddress => "Please enter a delivery address",
            Self::IdNotVerified => "Please upload a valid government ID",
            Self::TermsNotAccepted => "Please accept the terms and conditions",
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Checkout progress as shown to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    #[default]
    Idle,
    Validating,
    Processing,
    Success,
    Failed,
}

impl CheckoutStatus {
    /// Whether the machine may move from `self` to `next`.
    ///
    /// `idle -> validating -> processing -> success | failed`; validation can
    /// fail straight away, and a failed checkout can be retried from idle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Failed, Self::Validating)
                | (Self::Validating, Self::Processing | Self::Failed)
                | (Self::Processing, Self::Success | Self::Failed)
                | (Self::Failed, Self::Idle)
        )
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::IllegalTransition` if the move is not allowed.
    pub fn transition(self, next: Self) -> Result<Self, CheckoutError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CheckoutError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Whether the checkout has finished, one way or the other.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Errors from checkout validation and status changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("checkout form is invalid: {}", join_issues(.0))]
    Invalid(Vec<ValidationIssue>),

    #[error("illegal checkout transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: CheckoutStatus,
        to: CheckoutStatus,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check the form against the cart. Returns every issue found, in display order.
#[must_use]
pub fn validation_issues(
    cart: &Cart,
    form: &CheckoutForm,
    id_verified: bool,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if cart.is_empty() {
        issues.push(ValidationIssue::EmptyCart);
    }
    if form.delivery_method.requires_address() && form.address.trim().is_empty() {
        issues.push(ValidationIssue::MissingAddress);
    }
    if !id_verified {
        issues.push(ValidationIssue::IdNotVerified);
    }
    if !form.terms_accepted {
        issues.push(ValidationIssue::TermsNotAccepted);
    }
    issues
}

/// Validate the form.
///
/// # Errors
///
/// Returns `CheckoutError::Invalid` listing every issue when the form cannot be submitted.
pub fn validate(cart: &Cart, form: &CheckoutForm, id_verified: bool) -> Result<(), CheckoutError> {
    let issues = validation_issues(cart, form, id_verified);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(CheckoutError::Invalid(issues))
    }
}

/// Totals the customer will be charged for this form. Pickup waives delivery.
#[must_use]
pub fn quote(cart: &Cart, form: &CheckoutForm) -> PriceSummary {
    cart.summary(form.delivery_method == DeliveryMethod::Pickup)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::cart::AddItemOptions;
    use crate::catalog::Catalog;
    use crate::types::ProductId;

    fn cart_with_blue_dream() -> Cart {
        let catalog = Catalog::from_fixtures().unwrap();
        let mut cart = Cart::new();
        cart.add_item(
            catalog.get(ProductId::new(3)).unwrap(),
            AddItemOptions::default(),
        )
        .unwrap();
        cart
    }

    fn complete_form() -> CheckoutForm {
        CheckoutForm {
            address: "1 Jamaica Ave, Queens, NY".to_string(),
            terms_accepted: true,
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn test_complete_form_passes() {
        assert_eq!(validate(&cart_with_blue_dream(), &complete_form(), true), Ok(()));
    }

    #[test]
    fn test_all_issues_reported_together() {
        let err = validate(&Cart::new(), &CheckoutForm::default(), false).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::Invalid(vec![
                ValidationIssue::EmptyCart,
                ValidationIssue::MissingAddress,
                ValidationIssue::IdNotVerified,
                ValidationIssue::TermsNotAccepted,
            ])
        );
        assert!(
            err.to_string()
                .contains("Your cart is empty; Please enter a delivery address")
        );
    }

    #[test]
    fn test_pickup_needs_no_address_and_skips_delivery_fee() {
        let cart = cart_with_blue_dream();
        let form = CheckoutForm {
            delivery_method: DeliveryMethod::Pickup,
            address: "   ".to_string(),
            terms_accepted: true,
            ..CheckoutForm::default()
        };
        assert_eq!(validate(&cart, &form, true), Ok(()));

        let pickup = quote(&cart, &form);
        assert_eq!(pickup.delivery_fee, Decimal::ZERO);
        assert_eq!(pickup.total, dec!(62.15));
        assert_eq!(quote(&cart, &complete_form()).total, dec!(67.15));
    }

    #[test]
    fn test_blank_address_rejected_for_delivery() {
        let form = CheckoutForm {
            address: "  \t".to_string(),
            ..complete_form()
        };
        assert_eq!(
            validate(&cart_with_blue_dream(), &form, true),
            Err(CheckoutError::Invalid(vec![ValidationIssue::MissingAddress]))
        );
    }

    #[test]
    fn test_status_transitions() {
        use CheckoutStatus::{Failed, Idle, Processing, Success, Validating};

        let status = Idle.transition(Validating).unwrap();
        let status = status.transition(Processing).unwrap();
        let status = status.transition(Success).unwrap();
        assert!(status.is_terminal());

        assert!(Validating.transition(Failed).is_ok());
        assert!(Failed.transition(Validating).is_ok());
        assert!(Failed.transition(Idle).is_ok());

        assert_eq!(
            Idle.transition(Success),
            Err(CheckoutError::IllegalTransition {
                from: Idle,
                to: Success
            })
        );
        assert!(Success.transition(Processing).is_err());
        assert!(Processing.transition(Validating).is_err());
    }
}
