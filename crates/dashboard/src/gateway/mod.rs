//! Remote data gateway.
//!
//! Every read and write the dashboards perform goes through
//! [`RemoteGateway`]. The production implementation is
//! [`UserClient`](crate::supabase::UserClient); tests use
//! [`InMemoryGateway`] or a generated mock.

#[cfg(any(test, feature = "test-support"))]
mod memory;

#[cfg(any(test, feature = "test-support"))]
pub use memory::{GatewayOperation, InMemoryGateway, ProvisionedAccount};

use async_trait::async_trait;
use fruit_union_core::{
    Customer, CustomerId, Delivery, DeliveryId, DeliveryStatusChange, NewCustomerAccount,
    SubscriptionStatus,
};
use thiserror::Error;

use crate::supabase::SupabaseError;

/// Errors surfaced by a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] SupabaseError),

    /// The backend refused the operation.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Operations the dashboards need from the backend.
///
/// All calls run with the signed-in user's credentials; authorization is
/// enforced by the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// All customers with their profile, newest first.
    async fn list_customers(&self) -> Result<Vec<Customer>, GatewayError>;

    /// One customer's deliveries, most recent date first.
    async fn list_deliveries(&self, customer_id: CustomerId) -> Result<Vec<Delivery>, GatewayError>;

    async fn count_customers(&self) -> Result<u64, GatewayError>;

    async fn count_deliveries(&self) -> Result<u64, GatewayError>;

    async fn count_partners(&self) -> Result<u64, GatewayError>;

    /// Deliveries in pending, assigned or in-transit status.
    async fn count_active_deliveries(&self) -> Result<u64, GatewayError>;

    /// Set a customer's subscription status.
    ///
    /// Returns the updated row, or `None` when the backend confirmed the
    /// write without returning it.
    async fn update_subscription_status(
        &self,
        customer_id: CustomerId,
        status: SubscriptionStatus,
    ) -> Result<Option<Customer>, GatewayError>;

    /// Apply a combined status/timestamp change to a delivery.
    async fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        change: DeliveryStatusChange,
    ) -> Result<Option<Delivery>, GatewayError>;

    /// Provision a login, profile, customer role and customer row in one
    /// server-side transaction.
    ///
    /// Not idempotent: a repeated call attempts a duplicate account.
    async fn create_customer_account(&self, account: &NewCustomerAccount) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = GatewayError::Rejected("User already registered".to_string());
        assert_eq!(err.to_string(), "rejected: User already registered");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = GatewayError::from(SupabaseError::MissingCount);
        assert_eq!(err.to_string(), "response did not include an exact count");
    }
}
