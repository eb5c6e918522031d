//! Status enums for customers, deliveries and dashboard users.
//!
//! All enums use the snake_case spelling stored in the backend tables, so the
//! same strings appear in JSON, in query filters and on the command line.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known enum variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Subscription plan chosen when a customer account is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionPlan {
    /// Backend spelling of the plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(ParseEnumError::new("subscription plan", s)),
        }
    }
}

/// Subscription status of a customer.
///
/// Only the two observed values are modeled; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
}

impl SubscriptionStatus {
    /// Backend spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// The status an activate/deactivate toggle moves to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseEnumError::new("subscription status", s)),
        }
    }
}

/// Lifecycle status of a single delivery.
///
/// `Assigned` and `InTransit` are set by an external dispatch process; the
/// dashboards only ever move a delivery between `Pending` and `Delivered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Assigned,
    InTransit,
    Delivered,
}

impl DeliveryStatus {
    /// Statuses counted as "active deliveries" on the admin dashboard.
    pub const ACTIVE: [Self; 3] = [Self::Pending, Self::Assigned, Self::InTransit];

    /// Backend spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
        }
    }

    /// Whether the delivery still has to be dropped off.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            _ => Err(ParseEnumError::new("delivery status", s)),
        }
    }
}

/// Role of a signed-in user, as recorded in the backend `user_roles` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Manages customers and subscriptions.
    Admin,
    /// Marks deliveries as dropped off.
    DeliveryPartner,
    /// Subscriber; has no dashboard access.
    Customer,
}

impl UserRole {
    /// Path of the dashboard this role lands on after sign-in.
    #[must_use]
    pub const fn dashboard_path(self) -> Option<&'static str> {
        match self {
            Self::Admin => Some("/admin"),
            Self::DeliveryPartner => Some("/partner"),
            Self::Customer => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::DeliveryPartner => write!(f, "delivery_partner"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "delivery_partner" => Ok(Self::DeliveryPartner),
            "customer" => Ok(Self::Customer),
            _ => Err(ParseEnumError::new("user role", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_status_toggle() {
        assert_eq!(
            SubscriptionStatus::Active.toggled(),
            SubscriptionStatus::Inactive
        );
        assert_eq!(
            SubscriptionStatus::Inactive.toggled(),
            SubscriptionStatus::Active
        );
    }

    #[test]
    fn test_subscription_status_rejects_unmodeled_values() {
        for value in ["suspended", "trial", "cancelled", "Active", ""] {
            assert!(value.parse::<SubscriptionStatus>().is_err(), "{value}");
        }
    }

    #[test]
    fn test_delivery_status_active_set() {
        assert!(DeliveryStatus::Pending.is_active());
        assert!(DeliveryStatus::Assigned.is_active());
        assert!(DeliveryStatus::InTransit.is_active());
        assert!(!DeliveryStatus::Delivered.is_active());
        assert!(DeliveryStatus::ACTIVE.iter().all(|s| s.is_active()));
    }

    #[test]
    fn test_delivery_status_serde_snake_case() {
        let json = serde_json::to_string(&DeliveryStatus::InTransit).unwrap();
        assert_eq!(json, "\"in_transit\"");
        let parsed: DeliveryStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, DeliveryStatus::Delivered);
    }

    #[test]
    fn test_display_matches_from_str() {
        for status in [
            DeliveryStatus::Pending,
            DeliveryStatus::Assigned,
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
        ] {
            assert_eq!(status.to_string().parse::<DeliveryStatus>().unwrap(), status);
        }
        for plan in [
            SubscriptionPlan::Basic,
            SubscriptionPlan::Premium,
            SubscriptionPlan::Enterprise,
        ] {
            assert_eq!(plan.to_string().parse::<SubscriptionPlan>().unwrap(), plan);
        }
    }

    #[test]
    fn test_plan_default_is_basic() {
        assert_eq!(SubscriptionPlan::default(), SubscriptionPlan::Basic);
    }

    #[test]
    fn test_user_role_dashboard_path() {
        assert_eq!(UserRole::Admin.dashboard_path(), Some("/admin"));
        assert_eq!(UserRole::DeliveryPartner.dashboard_path(), Some("/partner"));
        assert_eq!(UserRole::Customer.dashboard_path(), None);
        assert_eq!(
            "delivery_partner".parse::<UserRole>().unwrap(),
            UserRole::DeliveryPartner
        );
    }

    #[test]
    fn test_parse_error_message() {
        let err = "gold".parse::<SubscriptionPlan>().unwrap_err();
        assert_eq!(err.to_string(), "invalid subscription plan: gold");
    }
}
