//! Administrator dashboard controller.
//!
//! Loads aggregate counts and the customer roster, provisions customer
//! accounts, flips subscription status and opens customer delivery history.

use fruit_union_core::{
    CustomerId, DashboardStats, NewCustomerAccount, NewCustomerForm,
    SubscriptionStatus,
};
use tracing::{error, info, instrument, warn};

use crate::gateway::{GatewayError, RemoteGateway};
use crate::models::{AdminView, RosterView};

use super::{DeliveryHistoryCache, Failure, Outcome, open_customer};

/// User actions on the administrator dashboard.
#[derive(Debug, Clone)]
pub enum AdminCommand {
    /// Reload counts and roster.
    Refresh,
    /// Provision a new customer account.
    CreateCustomer(NewCustomerForm),
    /// Set a customer's subscription to `status`.
    SetSubscriptionStatus {
        customer_id: CustomerId,
        status: SubscriptionStatus,
    },
    /// Flip a roster customer between active and inactive.
    ToggleSubscription(CustomerId),
    /// Open a customer's delivery history.
    ViewCustomer(CustomerId),
    /// Close the open customer.
    CloseCustomer,
}

impl AdminCommand {
    const fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::CreateCustomer(_) => "create_customer",
            Self::SetSubscriptionStatus { .. } => "set_subscription_status",
            Self::ToggleSubscription(_) => "toggle_subscription",
            Self::ViewCustomer(_) => "view_customer",
            Self::CloseCustomer => "close_customer",
        }
    }
}

/// Drives the administrator dashboard against a gateway.
pub struct AdminController<'a, G: ?Sized> {
    gateway: &'a G,
    history: &'a DeliveryHistoryCache,
}

impl<'a, G> AdminController<'a, G>
where
    G: RemoteGateway + ?Sized,
{
    #[must_use]
    pub const fn new(gateway: &'a G, history: &'a DeliveryHistoryCache) -> Self {
        Self { gateway, history }
    }

    /// Apply `command` to `view` and return the next view.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn dispatch(&self, view: &AdminView, command: AdminCommand) -> Outcome<AdminView> {
        match command {
            AdminCommand::Refresh => self.refresh(view).await,
            AdminCommand::CreateCustomer(form) => self.create_customer(view, &form).await,
            AdminCommand::SetSubscriptionStatus {
                customer_id,
                status,
            } => self.set_subscription_status(view, customer_id, status).await,
            AdminCommand::ToggleSubscription(customer_id) => {
                match view.find_customer(customer_id) {
                    Some(customer) => {
                        let status = customer.subscription_status.toggled();
                        self.set_subscription_status(view, customer_id, status)
                            .await
                    }
                    None => Outcome::failed(view.clone(), Failure::Validation, "Customer not found"),
                }
            }
            AdminCommand::ViewCustomer(customer_id) => {
                open_customer(self.gateway, self.history, view, customer_id).await
            }
            AdminCommand::CloseCustomer => Outcome::quiet(view.with_selected(None)),
        }
    }

    /// The four dashboard counts, fetched concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first gateway error; partial counts are discarded.
    pub async fn load_stats(&self) -> Result<DashboardStats, GatewayError> {
        let (total_customers, total_deliveries, total_partners, active_deliveries) = tokio::try_join!(
            self.gateway.count_customers(),
            self.gateway.count_deliveries(),
            self.gateway.count_partners(),
            self.gateway.count_active_deliveries(),
        )?;
        Ok(DashboardStats {
            total_customers,
            total_deliveries,
            total_partners,
            active_deliveries,
        })
    }

    async fn refresh(&self, view: &AdminView) -> Outcome<AdminView> {
        let (stats, customers) = tokio::join!(self.load_stats(), self.gateway.list_customers());

        let mut next = view.clone();
        let mut roster_failed = false;

        match customers {
            Ok(customers) => next = next.with_roster(customers),
            Err(e) => {
                error!(error = %e, "Error fetching customers");
                roster_failed = true;
            }
        }
        match stats {
            Ok(stats) => next = next.with_stats(stats),
            Err(e) => {
                error!(error = %e, "Error fetching stats");
                return Outcome::failed(next, Failure::Remote, "Failed to fetch statistics");
            }
        }

        if roster_failed {
            Outcome::silent_failure(next)
        } else {
            Outcome::quiet(next)
        }
    }

    async fn create_customer(&self, view: &AdminView, form: &NewCustomerForm) -> Outcome<AdminView> {
        let account = match NewCustomerAccount::from_form(form) {
            Ok(account) => account,
            Err(e) => {
                warn!(error = %e, "Rejected provisioning form");
                return Outcome::failed(
                    view.clone(),
                    Failure::Validation,
                    "Please fill in all required fields",
                );
            }
        };

        if let Err(e) = self.gateway.create_customer_account(&account).await {
            error!(error = %e, username = account.username(), "Error creating customer");
            return Outcome::failed(
                view.clone(),
                Failure::Remote,
                "Failed to create customer account",
            );
        }

        info!(login = %account.login_address(), "Customer account created");

        // The new account changes both the roster and every count.
        let reloaded = self.refresh(view).await;
        Outcome::success(
            reloaded.view,
            format!("Customer created! Login: {}", account.login_address()),
        )
    }

    async fn set_subscription_status(
        &self,
        view: &AdminView,
        customer_id: CustomerId,
        status: SubscriptionStatus,
    ) -> Outcome<AdminView> {
        let next = match self
            .gateway
            .update_subscription_status(customer_id, status)
            .await
        {
            Ok(Some(updated)) => view.with_customer_patched(&updated),
            Ok(None) => match self.gateway.list_customers().await {
                Ok(customers) => view.with_roster(customers),
                Err(e) => {
                    error!(error = %e, "Error fetching customers");
                    view.clone()
                }
            },
            Err(e) => {
                error!(error = %e, customer_id = %customer_id, "Error updating subscription");
                return Outcome::failed(view.clone(), Failure::Remote, "Failed to update subscription");
            }
        };

        info!(customer_id = %customer_id, status = %status, "Subscription updated");
        Outcome::success(next, "Subscription updated successfully")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use fruit_union_core::{DeliveryStatus, SubscriptionPlan};

    use super::*;
    use crate::gateway::{GatewayOperation, InMemoryGateway, MockRemoteGateway};
    use crate::services::NotificationKind;

    fn form(username: &str, password: &str, full_name: &str) -> NewCustomerForm {
        NewCustomerForm {
            username: username.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
            phone: None,
            subscription_plan: Some(SubscriptionPlan::Premium),
        }
    }

    fn seeded() -> (InMemoryGateway, CustomerId) {
        let gateway = InMemoryGateway::new();
        let asha = gateway.add_customer("Asha", SubscriptionPlan::Basic, SubscriptionStatus::Active);
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        gateway.add_delivery(asha, date, "Mangoes", DeliveryStatus::Pending);
        gateway.add_delivery(asha, date, "Guava", DeliveryStatus::InTransit);
        gateway.add_delivery(asha, date, "Papaya", DeliveryStatus::Delivered);
        gateway.set_partner_count(2);
        (gateway, asha)
    }

    #[tokio::test]
    async fn test_refresh_loads_stats_and_roster() {
        let (gateway, asha) = seeded();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);

        let outcome = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await;

        assert!(!outcome.is_failure());
        assert_eq!(
            outcome.view.stats,
            DashboardStats {
                total_customers: 1,
                total_deliveries: 3,
                total_partners: 2,
                active_deliveries: 2,
            }
        );
        assert_eq!(outcome.view.customers[0].id, asha);
    }

    #[tokio::test]
    async fn test_refresh_stats_failure_keeps_previous_stats() {
        let (gateway, _) = seeded();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let first = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await;

        gateway.fail(GatewayOperation::CountDeliveries);
        gateway.add_customer("Ravi", SubscriptionPlan::Basic, SubscriptionStatus::Active);
        let outcome = controller.dispatch(&first.view, AdminCommand::Refresh).await;

        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert_eq!(outcome.notification.unwrap().message, "Failed to fetch statistics");
        assert_eq!(outcome.view.stats, first.view.stats);
        // roster still refreshed
        assert_eq!(outcome.view.customers.len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_roster_failure_is_silent() {
        let (gateway, _) = seeded();
        gateway.fail(GatewayOperation::ListCustomers);
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);

        let outcome = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await;

        assert!(outcome.notification.is_none());
        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert!(outcome.view.customers.is_empty());
        assert_eq!(outcome.view.stats.total_customers, 1);
    }

    #[tokio::test]
    async fn test_create_customer_success() {
        let (gateway, _) = seeded();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let before = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await.view;

        let outcome = controller
            .dispatch(
                &before,
                AdminCommand::CreateCustomer(form("jane_d", "secret123", "Jane Doe")),
            )
            .await;

        let notification = outcome.notification.unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, "Customer created! Login: jane_d@internal.local");
        assert_eq!(outcome.view.customers.len(), before.customers.len() + 1);
        assert_eq!(outcome.view.stats.total_customers, 2);
        assert_eq!(outcome.view.customers[0].full_name(), "Jane Doe");
        assert_eq!(outcome.view.customers[0].subscription_plan, SubscriptionPlan::Premium);
    }

    #[tokio::test]
    async fn test_create_customer_blank_fields_never_call_remote() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_create_customer_account().never();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);

        for bad in [
            form("", "secret123", "Jane Doe"),
            form("jane_d", "", "Jane Doe"),
            form("jane_d", "secret123", "   "),
        ] {
            let outcome = controller
                .dispatch(&AdminView::default(), AdminCommand::CreateCustomer(bad))
                .await;
            assert_eq!(outcome.failure, Some(Failure::Validation));
            assert_eq!(
                outcome.notification.unwrap().message,
                "Please fill in all required fields"
            );
        }
    }

    #[tokio::test]
    async fn test_create_customer_remote_failure() {
        let (gateway, _) = seeded();
        gateway.fail(GatewayOperation::CreateCustomerAccount);
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let before = AdminView::default();

        let outcome = controller
            .dispatch(
                &before,
                AdminCommand::CreateCustomer(form("jane_d", "secret123", "Jane Doe")),
            )
            .await;

        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert_eq!(
            outcome.notification.unwrap().message,
            "Failed to create customer account"
        );
        assert_eq!(outcome.view, before);
        assert_eq!(gateway.call_count(GatewayOperation::ListCustomers), 0);
    }

    #[tokio::test]
    async fn test_toggle_patches_roster_with_confirmed_row() {
        let (gateway, asha) = seeded();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let view = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await.view;
        let lists_before = gateway.call_count(GatewayOperation::ListCustomers);

        let outcome = controller
            .dispatch(&view, AdminCommand::ToggleSubscription(asha))
            .await;

        assert_eq!(
            outcome.notification.unwrap().message,
            "Subscription updated successfully"
        );
        let row = &outcome.view.customers[0];
        assert_eq!(row.subscription_status, SubscriptionStatus::Inactive);
        assert_eq!(row.full_name(), "Asha");
        assert_eq!(gateway.call_count(GatewayOperation::ListCustomers), lists_before);
    }

    #[tokio::test]
    async fn test_set_status_reloads_when_no_row_returned() {
        let (gateway, asha) = seeded();
        gateway.omit_returned_rows(true);
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);

        let outcome = controller
            .dispatch(
                &AdminView::default(),
                AdminCommand::SetSubscriptionStatus {
                    customer_id: asha,
                    status: SubscriptionStatus::Inactive,
                },
            )
            .await;

        assert!(!outcome.is_failure());
        assert_eq!(
            outcome.view.customers[0].subscription_status,
            SubscriptionStatus::Inactive
        );
    }

    #[tokio::test]
    async fn test_set_status_failure_leaves_view() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_update_subscription_status()
            .times(1)
            .returning(|_, _| Err(GatewayError::Rejected("permission denied".to_string())));
        gateway.expect_list_customers().never();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let view = AdminView::default();

        let outcome = controller
            .dispatch(
                &view,
                AdminCommand::SetSubscriptionStatus {
                    customer_id: CustomerId::random(),
                    status: SubscriptionStatus::Active,
                },
            )
            .await;

        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert_eq!(outcome.notification.unwrap().message, "Failed to update subscription");
        assert_eq!(outcome.view, view);
    }

    #[tokio::test]
    async fn test_toggle_unknown_customer() {
        let mut gateway = MockRemoteGateway::new();
        gateway.expect_update_subscription_status().never();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);

        let outcome = controller
            .dispatch(
                &AdminView::default(),
                AdminCommand::ToggleSubscription(CustomerId::random()),
            )
            .await;
        assert_eq!(outcome.failure, Some(Failure::Validation));
    }

    #[tokio::test]
    async fn test_view_and_close_customer() {
        let (gateway, asha) = seeded();
        let history = DeliveryHistoryCache::disabled();
        let controller = AdminController::new(&gateway, &history);
        let view = controller.dispatch(&AdminView::default(), AdminCommand::Refresh).await.view;

        let opened = controller
            .dispatch(&view, AdminCommand::ViewCustomer(asha))
            .await
            .view;
        let detail = opened.selected.as_ref().unwrap();
        assert_eq!(detail.customer.id, asha);
        assert_eq!(detail.deliveries.len(), 3);

        let closed = controller.dispatch(&opened, AdminCommand::CloseCustomer).await;
        assert!(closed.view.selected.is_none());
        assert_eq!(closed.view.customers, opened.customers);
    }
}
