//! Guardio Life plan catalog
//!
//! Plans are only selectable once the user's age is verified.

use rust_decimal_macros::dec;
use serde::Serialize;

use core_kernel::{Currency, Money};

/// An insurance plan offered on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsurancePlan {
    /// URL-safe identifier used by the selection endpoint
    pub slug: &'static str,
    pub title: &'static str,
    pub monthly_premium: Money,
    pub features: Vec<&'static str>,
    pub button_text: &'static str,
}

/// All plans, in display order
pub fn plan_catalog() -> Vec<InsurancePlan> {
    vec![
        InsurancePlan {
            slug: "retirement",
            title: "Retirement Plan",
            monthly_premium: Money::new(dec!(20), Currency::USD),
            features: vec![
                "8% Minimum ROI",
                "Hospitalization Cover",
                "100 Years Plus - Life Cover",
                "Critical Illness Cover",
            ],
            button_text: "Get started",
        },
        InsurancePlan {
            slug: "wealth",
            title: "Wealth Plan",
            monthly_premium: Money::new(dec!(25), Currency::USD),
            features: vec![
                "12% Minimum ROI",
                "Hospitalization Cover",
                "Partial Withdrawals",
                "Flexible Term Options",
            ],
            button_text: "Get started",
        },
        InsurancePlan {
            slug: "premium-relief",
            title: "Premium Relief Plan",
            monthly_premium: Money::new(dec!(30), Currency::USD),
            features: vec![
                "16% Minimum ROI",
                "Hospitalization Cover",
                "100 Years Plus - Life Cover",
                "Family Health Cover",
            ],
            button_text: "Get started",
        },
    ]
}

/// Looks up a plan by slug
pub fn find_plan(slug: &str) -> Option<InsurancePlan> {
    plan_catalog().into_iter().find(|plan| plan.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_prices() {
        let plans = plan_catalog();
        let titles: Vec<_> = plans.iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Retirement Plan", "Wealth Plan", "Premium Relief Plan"]);
        assert_eq!(plans[1].monthly_premium.to_string(), "$25.00");
    }

    #[test]
    fn test_find_plan() {
        assert_eq!(find_plan("wealth").map(|p| p.title), Some("Wealth Plan"));
        assert!(find_plan("enterprise").is_none());
    }

    #[test]
    fn test_every_plan_lists_four_features() {
        assert!(plan_catalog().iter().all(|plan| plan.features.len() == 4));
    }
}
