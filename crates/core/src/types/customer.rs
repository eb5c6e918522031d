//! Customer and profile records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomerId, SubscriptionPlan, SubscriptionStatus, UserId};

/// Personal contact details linked one-to-one with a customer's user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A subscriber with plan, status and billing date.
///
/// Rows come from the `customers` table with the `profiles` relation
/// embedded one level deep, so the profile keeps the relation's name on the
/// wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub subscription_plan: SubscriptionPlan,
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub next_payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "profiles", default)]
    pub profile: Option<Profile>,
}

impl Customer {
    /// Display name, falling back to an empty string without a profile.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.profile.as_ref().map_or("", |p| p.full_name.as_str())
    }

    /// Phone number, or `N/A` when none is on file.
    #[must_use]
    pub fn phone_display(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.phone.as_deref())
            .filter(|p| !p.is_empty())
            .unwrap_or("N/A")
    }

    /// Whether the subscription is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Active
    }
}
