//! Dashboard controllers.
//!
//! # Services
//!
//! - `admin` - Administrator dashboard: counts, roster, provisioning,
//!   subscription status
//! - `delivery_partner` - Delivery partner dashboard: roster and delivery
//!   status toggles
//! - `history` - Per-customer delivery history cache
//! - `notification` - Command outcomes and user-facing messages
//!
//! Controllers borrow a [`RemoteGateway`] for the duration of one command
//! and never hold state between commands: the caller passes the current view
//! in and keeps the view that comes back.

pub mod admin;
pub mod delivery_partner;
pub mod history;
pub mod notification;

pub use admin::{AdminCommand, AdminController};
pub use delivery_partner::{DeliveryPartnerController, PartnerCommand};
pub use history::DeliveryHistoryCache;
pub use notification::{Failure, Notification, NotificationKind, Outcome};

use fruit_union_core::CustomerId;
use tracing::error;

use crate::gateway::RemoteGateway;
use crate::models::{CustomerDetail, RosterView};

/// Select `customer_id` and load their delivery history.
///
/// A customer missing from the view is looked up in a fresh roster. A failed
/// history fetch is logged and the customer opens with an empty list.
async fn open_customer<G, V>(
    gateway: &G,
    history: &DeliveryHistoryCache,
    view: &V,
    customer_id: CustomerId,
) -> Outcome<V>
where
    G: RemoteGateway + ?Sized,
    V: RosterView,
{
    let (view, customer) = match view.find_customer(customer_id) {
        Some(customer) => (view.clone(), customer.clone()),
        None => {
            let customers = match gateway.list_customers().await {
                Ok(customers) => customers,
                Err(e) => {
                    error!(error = %e, "Error fetching customers");
                    return Outcome::silent_failure(view.clone());
                }
            };
            let next = view.with_roster(customers);
            match next.find_customer(customer_id).cloned() {
                Some(customer) => (next, customer),
                None => return Outcome::failed(next, Failure::Validation, "Customer not found"),
            }
        }
    };

    match history.load(gateway, customer_id).await {
        Ok(deliveries) => Outcome::quiet(view.with_selected(Some(CustomerDetail {
            customer,
            deliveries: deliveries.as_ref().clone(),
        }))),
        Err(e) => {
            error!(error = %e, customer_id = %customer_id, "Error fetching deliveries");
            Outcome::silent_failure(view.with_selected(Some(CustomerDetail {
                customer,
                deliveries: Vec::new(),
            })))
        }
    }
}
