//! Pricing catalog shown on the marketing site.

use serde::Serialize;

use super::{CurrencyCode, Price};

/// A subscription offer as advertised to visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricingPlan {
    pub name: &'static str,
    pub price: Price,
    /// Formatted price, e.g. `₹549`.
    pub price_display: String,
    /// Billing period suffix, e.g. `/week`.
    pub period: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

impl PricingPlan {
    fn new(
        name: &'static str,
        rupees: i64,
        period: &'static str,
        features: &'static [&'static str],
        popular: bool,
    ) -> Self {
        let price = Price::whole(rupees, CurrencyCode::INR);
        Self {
            name,
            price,
            price_display: price.display(),
            period,
            features,
            popular,
        }
    }
}

/// The advertised plans, in display order.
#[must_use]
pub fn pricing_plans() -> Vec<PricingPlan> {
    vec![
        PricingPlan::new(
            "Weekly Plan",
            299,
            "/week",
            &[
                "Fresh fruits delivery every week",
                "Seasonal variety selection",
                "Free delivery within city",
                "Cancel anytime",
            ],
            false,
        ),
        PricingPlan::new(
            "Bi-Weekly Plan",
            549,
            "/2 weeks",
            &[
                "Fresh fruits delivery twice a month",
                "Premium seasonal fruits",
                "Free delivery",
                "Flexible scheduling",
            ],
            true,
        ),
        PricingPlan::new(
            "Monthly Plan",
            999,
            "/month",
            &[
                "Weekly fresh fruit deliveries",
                "Premium exotic fruits included",
                "Priority delivery slots",
                "Dedicated support",
            ],
            false,
        ),
    ]
}
