//! Aggregate counts shown on the admin dashboard.

use serde::{Deserialize, Serialize};

use super::DeliveryStatus;

/// Aggregate counts across the backend tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_customers: u64,
    pub total_deliveries: u64,
    pub total_partners: u64,
    /// Deliveries whose status is pending, assigned or in transit.
    pub active_deliveries: u64,
}

impl DashboardStats {
    /// Count the active deliveries in a set of statuses.
    pub fn count_active<I>(statuses: I) -> u64
    where
        I: IntoIterator<Item = DeliveryStatus>,
    {
        statuses.into_iter().filter(|s| s.is_active()).count() as u64
    }
}
