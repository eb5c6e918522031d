//! In-memory gateway for tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use fruit_union_core::{
    Customer, CustomerId, DashboardStats, Delivery, DeliveryId, DeliveryStatus,
    DeliveryStatusChange, Email, NewCustomerAccount, Profile, SubscriptionPlan,
    SubscriptionStatus, UserId,
};

use super::{GatewayError, RemoteGateway};

/// Days between provisioning and the first payment.
const FIRST_PAYMENT_AFTER_DAYS: i64 = 30;

/// A gateway call, as recorded by [`InMemoryGateway`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    ListCustomers,
    ListDeliveries,
    CountCustomers,
    CountDeliveries,
    CountPartners,
    CountActiveDeliveries,
    UpdateSubscriptionStatus,
    UpdateDeliveryStatus,
    CreateCustomerAccount,
}

/// An account created through the provisioning procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
    pub login: Email,
    pub full_name: String,
    pub phone: Option<String>,
    pub plan: SubscriptionPlan,
    pub customer_id: CustomerId,
}

/// Backend stand-in holding customers and deliveries in memory.
///
/// Records every call, and can be told to fail specific operations.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    customers: Vec<Customer>,
    deliveries: Vec<Delivery>,
    partners: u64,
    provisioned: Vec<ProvisionedAccount>,
    calls: Vec<GatewayOperation>,
    failing: HashSet<GatewayOperation>,
    omit_returned_rows: bool,
    clock: DateTime<Utc>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            customers: Vec::new(),
            deliveries: Vec::new(),
            partners: 0,
            provisioned: Vec::new(),
            calls: Vec::new(),
            failing: HashSet::new(),
            omit_returned_rows: false,
            clock: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000),
        }
    }
}

impl MemoryState {
    /// Advance the fake clock so creation timestamps are strictly ordered.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += TimeDelta::seconds(1);
        self.clock
    }

    fn record(&mut self, op: GatewayOperation) -> Result<(), GatewayError> {
        self.calls.push(op);
        if self.failing.contains(&op) {
            return Err(GatewayError::Rejected(format!("{op:?} failed")));
        }
        Ok(())
    }

    fn insert_customer(
        &mut self,
        full_name: &str,
        phone: Option<String>,
        plan: SubscriptionPlan,
        status: SubscriptionStatus,
        next_payment_date: Option<NaiveDate>,
    ) -> CustomerId {
        let id = CustomerId::random();
        let created_at = self.tick();
        self.customers.push(Customer {
            id,
            user_id: UserId::random(),
            subscription_plan: plan,
            subscription_status: status,
            next_payment_date,
            created_at: Some(created_at),
            profile: Some(Profile {
                full_name: full_name.to_owned(),
                phone,
            }),
        });
        id
    }
}

impl InMemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a customer with a profile.
    pub fn add_customer(
        &self,
        full_name: &str,
        plan: SubscriptionPlan,
        status: SubscriptionStatus,
    ) -> CustomerId {
        self.lock()
            .insert_customer(full_name, None, plan, status, None)
    }

    /// Seed a delivery. Delivered rows get a timestamp.
    pub fn add_delivery(
        &self,
        customer_id: CustomerId,
        delivery_date: NaiveDate,
        items: &str,
        status: DeliveryStatus,
    ) -> DeliveryId {
        let mut state = self.lock();
        let id = DeliveryId::random();
        let delivered_at = (status == DeliveryStatus::Delivered).then(|| state.tick());
        state.deliveries.push(Delivery {
            id,
            customer_id,
            delivery_date,
            delivery_address: "12 Orchard Lane".to_string(),
            items: items.to_owned(),
            delivery_status: status,
            delivered_at,
        });
        id
    }

    pub fn set_partner_count(&self, partners: u64) {
        self.lock().partners = partners;
    }

    /// Make every subsequent `op` call fail.
    pub fn fail(&self, op: GatewayOperation) {
        self.lock().failing.insert(op);
    }

    /// Undo [`InMemoryGateway::fail`].
    pub fn recover(&self, op: GatewayOperation) {
        self.lock().failing.remove(&op);
    }

    /// Confirm updates without returning the updated row.
    pub fn omit_returned_rows(&self, omit: bool) {
        self.lock().omit_returned_rows = omit;
    }

    /// Current customers, newest first.
    #[must_use]
    pub fn customers(&self) -> Vec<Customer> {
        let mut customers = self.lock().customers.clone();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        customers
    }

    #[must_use]
    pub fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.lock().customers.iter().find(|c| c.id == id).cloned()
    }

    #[must_use]
    pub fn delivery(&self, id: DeliveryId) -> Option<Delivery> {
        self.lock().deliveries.iter().find(|d| d.id == id).cloned()
    }

    #[must_use]
    pub fn provisioned(&self) -> Vec<ProvisionedAccount> {
        self.lock().provisioned.clone()
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayOperation> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, op: GatewayOperation) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn list_customers(&self) -> Result<Vec<Customer>, GatewayError> {
        self.lock().record(GatewayOperation::ListCustomers)?;
        Ok(self.customers())
    }

    async fn list_deliveries(&self, customer_id: CustomerId) -> Result<Vec<Delivery>, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::ListDeliveries)?;
        let mut deliveries: Vec<Delivery> = state
            .deliveries
            .iter()
            .filter(|d| d.customer_id == customer_id)
            .cloned()
            .collect();
        deliveries.sort_by(|a, b| b.delivery_date.cmp(&a.delivery_date));
        Ok(deliveries)
    }

    async fn count_customers(&self) -> Result<u64, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::CountCustomers)?;
        Ok(state.customers.len() as u64)
    }

    async fn count_deliveries(&self) -> Result<u64, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::CountDeliveries)?;
        Ok(state.deliveries.len() as u64)
    }

    async fn count_partners(&self) -> Result<u64, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::CountPartners)?;
        Ok(state.partners)
    }

    async fn count_active_deliveries(&self) -> Result<u64, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::CountActiveDeliveries)?;
        Ok(DashboardStats::count_active(
            state.deliveries.iter().map(|d| d.delivery_status),
        ))
    }

    async fn update_subscription_status(
        &self,
        customer_id: CustomerId,
        status: SubscriptionStatus,
    ) -> Result<Option<Customer>, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::UpdateSubscriptionStatus)?;
        let omit = state.omit_returned_rows;
        let Some(customer) = state.customers.iter_mut().find(|c| c.id == customer_id) else {
            return Ok(None);
        };
        customer.subscription_status = status;

        // PATCH returns the bare row, without the embedded profile.
        Ok((!omit).then(|| Customer {
            profile: None,
            ..customer.clone()
        }))
    }

    async fn update_delivery_status(
        &self,
        delivery_id: DeliveryId,
        change: DeliveryStatusChange,
    ) -> Result<Option<Delivery>, GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::UpdateDeliveryStatus)?;
        let omit = state.omit_returned_rows;
        let Some(delivery) = state.deliveries.iter_mut().find(|d| d.id == delivery_id) else {
            return Ok(None);
        };
        delivery.apply(&change);
        Ok((!omit).then(|| delivery.clone()))
    }

    async fn create_customer_account(&self, account: &NewCustomerAccount) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.record(GatewayOperation::CreateCustomerAccount)?;

        let login = account.login_address().clone();
        if state.provisioned.iter().any(|p| p.login == login) {
            return Err(GatewayError::Rejected("User already registered".to_string()));
        }

        let next_payment_date =
            (state.clock + TimeDelta::days(FIRST_PAYMENT_AFTER_DAYS)).date_naive();
        let customer_id = state.insert_customer(
            account.full_name(),
            account.phone().map(str::to_owned),
            account.plan(),
            SubscriptionStatus::Active,
            Some(next_payment_date),
        );
        state.provisioned.push(ProvisionedAccount {
            login,
            full_name: account.full_name().to_owned(),
            phone: account.phone().map(str::to_owned),
            plan: account.plan(),
            customer_id,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fruit_union_core::NewCustomerForm;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_roster_is_newest_first() {
        let gateway = InMemoryGateway::new();
        let older = gateway.add_customer("Asha", SubscriptionPlan::Basic, SubscriptionStatus::Active);
        let newer = gateway.add_customer("Ravi", SubscriptionPlan::Premium, SubscriptionStatus::Active);

        let roster = gateway.list_customers().await.unwrap();
        assert_eq!(roster.iter().map(|c| c.id).collect::<Vec<_>>(), vec![newer, older]);
    }

    #[tokio::test]
    async fn test_deliveries_most_recent_first() {
        let gateway = InMemoryGateway::new();
        let customer = gateway.add_customer("Asha", SubscriptionPlan::Basic, SubscriptionStatus::Active);
        gateway.add_delivery(customer, date(1), "Mangoes", DeliveryStatus::Delivered);
        gateway.add_delivery(customer, date(8), "Papaya", DeliveryStatus::Pending);

        let history = gateway.list_deliveries(customer).await.unwrap();
        assert_eq!(history[0].delivery_date, date(8));
        assert!(history.iter().all(Delivery::is_consistent));
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let gateway = InMemoryGateway::new();
        gateway.fail(GatewayOperation::CountPartners);
        assert!(gateway.count_partners().await.is_err());

        gateway.recover(GatewayOperation::CountPartners);
        assert_eq!(gateway.count_partners().await.unwrap(), 0);
        assert_eq!(gateway.call_count(GatewayOperation::CountPartners), 2);
    }

    #[tokio::test]
    async fn test_duplicate_provisioning_rejected() {
        let gateway = InMemoryGateway::new();
        let account = NewCustomerAccount::from_form(&NewCustomerForm {
            username: "jane_d".to_string(),
            password: "secret123".to_string(),
            full_name: "Jane Doe".to_string(),
            ..NewCustomerForm::default()
        })
        .unwrap();

        gateway.create_customer_account(&account).await.unwrap();
        assert!(matches!(
            gateway.create_customer_account(&account).await,
            Err(GatewayError::Rejected(_))
        ));
        assert_eq!(gateway.provisioned().len(), 1);
    }
}
