//! Static credit plan catalogue.
//!
//! The catalogue is fixed at startup; plan identifiers are unique and
//! never change for the life of the process.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A purchasable credit plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    /// Price in whole currency units (USD).
    pub price: f64,
    /// Credits granted once the purchase is confirmed.
    pub credits: u32,
    pub features: Vec<String>,
}

pub static PLAN_CATALOGUE: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![
        Plan {
            id: "basic".to_string(),
            name: "Basic".to_string(),
            price: 10.0,
            credits: 100,
            features: vec![
                "100 text generations".to_string(),
                "50 image generations".to_string(),
                "Standard support".to_string(),
                "Access to basic models".to_string(),
            ],
        },
        Plan {
            id: "pro".to_string(),
            name: "Pro".to_string(),
            price: 20.0,
            credits: 500,
            features: vec![
                "500 text generations".to_string(),
                "200 image generations".to_string(),
                "Priority support".to_string(),
                "Access to pro models".to_string(),
                "Faster response time".to_string(),
            ],
        },
        Plan {
            id: "premium".to_string(),
            name: "Premium".to_string(),
            price: 30.0,
            credits: 1000,
            features: vec![
                "1000 text generations".to_string(),
                "500 image generations".to_string(),
                "24/7 VIP support".to_string(),
                "Access to premium models".to_string(),
                "Dedicated account manager".to_string(),
            ],
        },
    ]
});

/// Look up a plan by identifier.
pub fn find_plan(plan_id: &str) -> Option<&'static Plan> {
    PLAN_CATALOGUE.iter().find(|plan| plan.id == plan_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_has_three_plans_with_unique_ids() {
        assert_eq!(PLAN_CATALOGUE.len(), 3);
        let ids: HashSet<&str> = PLAN_CATALOGUE.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn catalogue_values_are_fixed() {
        let basic = find_plan("basic").unwrap();
        assert_eq!(basic.price, 10.0);
        assert_eq!(basic.credits, 100);

        let pro = find_plan("pro").unwrap();
        assert_eq!(pro.price, 20.0);
        assert_eq!(pro.credits, 500);
        assert_eq!(pro.features.len(), 5);

        let premium = find_plan("premium").unwrap();
        assert_eq!(premium.price, 30.0);
        assert_eq!(premium.credits, 1000);
    }

    #[test]
    fn unknown_plan_id_is_rejected() {
        assert!(find_plan("enterprise").is_none());
        assert!(find_plan("").is_none());
    }
}
