//! Delivery records and the status change applied by delivery partners.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CustomerId, DeliveryId, DeliveryStatus};

/// One scheduled or completed fruit-box drop-off tied to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub customer_id: CustomerId,
    pub delivery_date: NaiveDate,
    pub delivery_address: String,
    pub items: String,
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Delivery {
    /// Apply a status change the way the backend does: both fields at once.
    pub fn apply(&mut self, change: &DeliveryStatusChange) {
        self.delivery_status = change.delivery_status;
        self.delivered_at = change.delivered_at;
    }

    /// Whether status and timestamp agree (`delivered_at` set iff delivered).
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        matches!(self.delivery_status, DeliveryStatus::Delivered) == self.delivered_at.is_some()
    }
}

/// Combined partial update of a delivery's status and timestamp.
///
/// Only constructible through [`DeliveryStatusChange::delivered`] and
/// [`DeliveryStatusChange::pending`], so the timestamp is present exactly
/// when the status is `delivered`. Both fields are always serialized; a
/// `null` timestamp clears the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryStatusChange {
    delivery_status: DeliveryStatus,
    delivered_at: Option<DateTime<Utc>>,
}

impl DeliveryStatusChange {
    /// Mark a delivery as dropped off at `at`.
    #[must_use]
    pub const fn delivered(at: DateTime<Utc>) -> Self {
        Self {
            delivery_status: DeliveryStatus::Delivered,
            delivered_at: Some(at),
        }
    }

    /// Reset a delivery to pending and clear its timestamp.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            delivery_status: DeliveryStatus::Pending,
            delivered_at: None,
        }
    }

    #[must_use]
    pub const fn delivery_status(&self) -> DeliveryStatus {
        self.delivery_status
    }

    #[must_use]
    pub const fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }
}
