//! Dashboard view state.
//!
//! Views are immutable snapshots. Every command produces a new view from the
//! previous one; nothing mutates a view in place once it has been returned.

use fruit_union_core::{Customer, CustomerId, DashboardStats, Delivery};
use serde::{Deserialize, Serialize};

/// One customer opened in a detail panel, with their delivery history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub deliveries: Vec<Delivery>,
}

/// What the administrator dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminView {
    pub stats: DashboardStats,
    pub customers: Vec<Customer>,
    pub selected: Option<CustomerDetail>,
}

/// What the delivery-partner dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerView {
    pub customers: Vec<Customer>,
    pub selected: Option<CustomerDetail>,
}

/// Roster and selection shared by both dashboards.
pub trait RosterView: Clone {
    fn customers(&self) -> &[Customer];

    fn selected(&self) -> Option<&CustomerDetail>;

    #[must_use]
    fn with_customers(&self, customers: Vec<Customer>) -> Self;

    #[must_use]
    fn with_selected(&self, selected: Option<CustomerDetail>) -> Self;

    fn find_customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers()
            .iter()
            .find(|c| c.id == id)
            .or_else(|| {
                self.selected()
                    .map(|d| &d.customer)
                    .filter(|c| c.id == id)
            })
    }

    /// Replace one customer's row in the roster and the open detail panel.
    ///
    /// Update responses carry no embedded profile, so the profile already on
    /// screen is kept when the incoming row has none.
    #[must_use]
    fn with_customer_patched(&self, updated: &Customer) -> Self {
        let merge = |existing: &Customer| Customer {
            profile: updated.profile.clone().or_else(|| existing.profile.clone()),
            ..updated.clone()
        };

        let customers = self
            .customers()
            .iter()
            .map(|c| if c.id == updated.id { merge(c) } else { c.clone() })
            .collect();
        let selected = self.selected().map(|detail| {
            if detail.customer.id == updated.id {
                CustomerDetail {
                    customer: merge(&detail.customer),
                    deliveries: detail.deliveries.clone(),
                }
            } else {
                detail.clone()
            }
        });

        self.with_customers(customers).with_selected(selected)
    }

    /// Swap in a freshly loaded roster, keeping the open detail panel in step.
    ///
    /// A selected customer missing from the new roster stays selected with
    /// its previous row.
    #[must_use]
    fn with_roster(&self, customers: Vec<Customer>) -> Self {
        let selected = self.selected().map(|detail| CustomerDetail {
            customer: customers
                .iter()
                .find(|c| c.id == detail.customer.id)
                .cloned()
                .unwrap_or_else(|| detail.customer.clone()),
            deliveries: detail.deliveries.clone(),
        });
        self.with_customers(customers).with_selected(selected)
    }
}

impl RosterView for AdminView {
    fn customers(&self) -> &[Customer] {
        &self.customers
    }

    fn selected(&self) -> Option<&CustomerDetail> {
        self.selected.as_ref()
    }

    fn with_customers(&self, customers: Vec<Customer>) -> Self {
        Self {
            customers,
            ..self.clone()
        }
    }

    fn with_selected(&self, selected: Option<CustomerDetail>) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }
}

impl RosterView for PartnerView {
    fn customers(&self) -> &[Customer] {
        &self.customers
    }

    fn selected(&self) -> Option<&CustomerDetail> {
        self.selected.as_ref()
    }

    fn with_customers(&self, customers: Vec<Customer>) -> Self {
        Self {
            customers,
            ..self.clone()
        }
    }

    fn with_selected(&self, selected: Option<CustomerDetail>) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }
}

impl AdminView {
    #[must_use]
    pub fn with_stats(&self, stats: DashboardStats) -> Self {
        Self {
            stats,
            ..self.clone()
        }
    }
}
