//! Pricing catalog.

use fruit_union_core::pricing_plans;

#[allow(clippy::print_stdout)]
pub fn show() {
    for plan in pricing_plans() {
        let badge = if plan.popular { "  (most popular)" } else { "" };
        println!("{} - {}{}{}", plan.name, plan.price_display, plan.period, badge);
        for feature in plan.features {
            println!("  • {feature}");
        }
    }
}
