//! Delivery partner dashboard controller.

use chrono::Utc;
use fruit_union_core::{CustomerId, DeliveryId, DeliveryStatusChange};
use tracing::{error, info, instrument};

use crate::gateway::RemoteGateway;
use crate::models::{CustomerDetail, PartnerView, RosterView};

use super::{DeliveryHistoryCache, Failure, Outcome, open_customer};

/// User actions on the delivery partner dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerCommand {
    /// Reload the roster.
    Refresh,
    /// Open a customer's delivery history.
    ViewCustomer(CustomerId),
    /// Record a drop-off now.
    MarkDelivered {
        delivery_id: DeliveryId,
        customer_id: CustomerId,
    },
    /// Undo a drop-off: back to pending, timestamp cleared.
    MarkPending {
        delivery_id: DeliveryId,
        customer_id: CustomerId,
    },
    /// Close the open customer.
    CloseCustomer,
}

impl PartnerCommand {
    const fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::ViewCustomer(_) => "view_customer",
            Self::MarkDelivered { .. } => "mark_delivered",
            Self::MarkPending { .. } => "mark_pending",
            Self::CloseCustomer => "close_customer",
        }
    }
}

/// Drives the delivery partner dashboard against a gateway.
pub struct DeliveryPartnerController<'a, G: ?Sized> {
    gateway: &'a G,
    history: &'a DeliveryHistoryCache,
}

impl<'a, G> DeliveryPartnerController<'a, G>
where
    G: RemoteGateway + ?Sized,
{
    #[must_use]
    pub const fn new(gateway: &'a G, history: &'a DeliveryHistoryCache) -> Self {
        Self { gateway, history }
    }

    /// Apply `command` to `view` and return the next view.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn dispatch(&self, view: &PartnerView, command: PartnerCommand) -> Outcome<PartnerView> {
        match command {
            PartnerCommand::Refresh => match self.gateway.list_customers().await {
                Ok(customers) => Outcome::quiet(view.with_roster(customers)),
                Err(e) => {
                    error!(error = %e, "Error fetching customers");
                    Outcome::failed(view.clone(), Failure::Remote, "Failed to fetch customers")
                }
            },
            PartnerCommand::ViewCustomer(customer_id) => {
                open_customer(self.gateway, self.history, view, customer_id).await
            }
            PartnerCommand::MarkDelivered {
                delivery_id,
                customer_id,
            } => {
                self.change_status(
                    view,
                    delivery_id,
                    customer_id,
                    DeliveryStatusChange::delivered(Utc::now()),
                )
                .await
            }
            PartnerCommand::MarkPending {
                delivery_id,
                customer_id,
            } => {
                self.change_status(view, delivery_id, customer_id, DeliveryStatusChange::pending())
                    .await
            }
            PartnerCommand::CloseCustomer => Outcome::quiet(view.with_selected(None)),
        }
    }

    async fn change_status(
        &self,
        view: &PartnerView,
        delivery_id: DeliveryId,
        customer_id: CustomerId,
        change: DeliveryStatusChange,
    ) -> Outcome<PartnerView> {
        if let Err(e) = self
            .gateway
            .update_delivery_status(delivery_id, change)
            .await
        {
            error!(error = %e, delivery_id = %delivery_id, "Error updating delivery");
            return Outcome::failed(
                view.clone(),
                Failure::Remote,
                "Failed to update delivery status",
            );
        }

        info!(
            delivery_id = %delivery_id,
            status = %change.delivery_status(),
            "Delivery status updated"
        );
        let message = if change.delivered_at().is_some() {
            "Delivery marked as delivered!"
        } else {
            "Delivery marked as not delivered"
        };

        // Only this customer's history is stale; the roster is untouched.
        // The open panel is reloaded only if it shows that customer.
        self.history.invalidate(customer_id).await;
        let next = match &view.selected {
            Some(detail) if detail.customer.id == customer_id => {
                match self.history.load(self.gateway, customer_id).await {
                    Ok(deliveries) => view.with_selected(Some(CustomerDetail {
                        customer: detail.customer.clone(),
                        deliveries: deliveries.as_ref().clone(),
                    })),
                    Err(e) => {
                        error!(error = %e, customer_id = %customer_id, "Error fetching deliveries");
                        view.clone()
                    }
                }
            }
            _ => view.clone(),
        };

        Outcome::success(next, message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use fruit_union_core::{DeliveryStatus, SubscriptionPlan, SubscriptionStatus};

    use super::*;
    use crate::gateway::{GatewayError, GatewayOperation, InMemoryGateway, MockRemoteGateway};

    struct Fixture {
        gateway: InMemoryGateway,
        customer: CustomerId,
        delivery: DeliveryId,
    }

    fn fixture() -> Fixture {
        let gateway = InMemoryGateway::new();
        let customer = gateway.add_customer("Asha", SubscriptionPlan::Basic, SubscriptionStatus::Active);
        let delivery = gateway.add_delivery(
            customer,
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            "Mangoes, Papaya",
            DeliveryStatus::Pending,
        );
        Fixture {
            gateway,
            customer,
            delivery,
        }
    }

    #[tokio::test]
    async fn test_refresh_failure_notifies() {
        let f = fixture();
        f.gateway.fail(GatewayOperation::ListCustomers);
        let history = DeliveryHistoryCache::disabled();
        let controller = DeliveryPartnerController::new(&f.gateway, &history);

        let outcome = controller.dispatch(&PartnerView::default(), PartnerCommand::Refresh).await;

        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert_eq!(outcome.notification.unwrap().message, "Failed to fetch customers");
    }

    #[tokio::test]
    async fn test_mark_delivered_then_pending() {
        let f = fixture();
        let history = DeliveryHistoryCache::new(Duration::from_secs(30));
        let controller = DeliveryPartnerController::new(&f.gateway, &history);
        let view = controller
            .dispatch(&PartnerView::default(), PartnerCommand::ViewCustomer(f.customer))
            .await
            .view;

        let delivered = controller
            .dispatch(
                &view,
                PartnerCommand::MarkDelivered {
                    delivery_id: f.delivery,
                    customer_id: f.customer,
                },
            )
            .await;
        assert_eq!(
            delivered.notification.unwrap().message,
            "Delivery marked as delivered!"
        );
        let shown = &delivered.view.selected.as_ref().unwrap().deliveries[0];
        assert_eq!(shown.delivery_status, DeliveryStatus::Delivered);
        assert!(shown.delivered_at.is_some());

        let pending = controller
            .dispatch(
                &delivered.view,
                PartnerCommand::MarkPending {
                    delivery_id: f.delivery,
                    customer_id: f.customer,
                },
            )
            .await;
        assert_eq!(
            pending.notification.unwrap().message,
            "Delivery marked as not delivered"
        );
        let shown = &pending.view.selected.as_ref().unwrap().deliveries[0];
        assert_eq!(shown.delivery_status, DeliveryStatus::Pending);
        assert!(shown.delivered_at.is_none());

        // roster never reloaded by a toggle
        assert_eq!(f.gateway.call_count(GatewayOperation::ListCustomers), 1);
    }

    #[tokio::test]
    async fn test_marking_another_customer_keeps_open_panel() {
        let f = fixture();
        let ravi = f
            .gateway
            .add_customer("Ravi", SubscriptionPlan::Premium, SubscriptionStatus::Active);
        let ravi_delivery = f.gateway.add_delivery(
            ravi,
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "Guava",
            DeliveryStatus::InTransit,
        );
        let history = DeliveryHistoryCache::disabled();
        let controller = DeliveryPartnerController::new(&f.gateway, &history);
        let roster = controller.dispatch(&PartnerView::default(), PartnerCommand::Refresh).await.view;
        let asha_open = controller
            .dispatch(&roster, PartnerCommand::ViewCustomer(f.customer))
            .await
            .view;

        let outcome = controller
            .dispatch(
                &asha_open,
                PartnerCommand::MarkDelivered {
                    delivery_id: ravi_delivery,
                    customer_id: ravi,
                },
            )
            .await;

        assert_eq!(
            outcome.notification.unwrap().message,
            "Delivery marked as delivered!"
        );
        assert_eq!(outcome.view, asha_open);
        assert_eq!(
            f.gateway.delivery(ravi_delivery).unwrap().delivery_status,
            DeliveryStatus::Delivered
        );
        // only the panel open call loaded a history
        assert_eq!(f.gateway.call_count(GatewayOperation::ListDeliveries), 1);
    }

    #[tokio::test]
    async fn test_toggle_failure_keeps_view() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_update_delivery_status()
            .times(1)
            .returning(|_, _| Err(GatewayError::Rejected("row-level security".to_string())));
        gateway.expect_list_deliveries().never();
        let history = DeliveryHistoryCache::disabled();
        let controller = DeliveryPartnerController::new(&gateway, &history);
        let view = PartnerView::default();

        let outcome = controller
            .dispatch(
                &view,
                PartnerCommand::MarkDelivered {
                    delivery_id: DeliveryId::random(),
                    customer_id: CustomerId::random(),
                },
            )
            .await;

        assert_eq!(outcome.failure, Some(Failure::Remote));
        assert_eq!(
            outcome.notification.unwrap().message,
            "Failed to update delivery status"
        );
        assert_eq!(outcome.view, view);
    }

    #[tokio::test]
    async fn test_mark_sends_combined_change() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_update_delivery_status()
            .withf(|_, change| {
                change.delivery_status() == DeliveryStatus::Delivered
                    && change.delivered_at().is_some()
            })
            .times(1)
            .returning(|_, _| Ok(None));
        let history = DeliveryHistoryCache::disabled();
        let controller = DeliveryPartnerController::new(&gateway, &history);

        let outcome = controller
            .dispatch(
                &PartnerView::default(),
                PartnerCommand::MarkDelivered {
                    delivery_id: DeliveryId::random(),
                    customer_id: CustomerId::random(),
                },
            )
            .await;
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn test_view_customer_uses_history_cache() {
        let f = fixture();
        let history = DeliveryHistoryCache::new(Duration::from_secs(30));
        let controller = DeliveryPartnerController::new(&f.gateway, &history);
        let view = controller.dispatch(&PartnerView::default(), PartnerCommand::Refresh).await.view;

        let opened = controller
            .dispatch(&view, PartnerCommand::ViewCustomer(f.customer))
            .await
            .view;
        let closed = controller.dispatch(&opened, PartnerCommand::CloseCustomer).await.view;
        let reopened = controller
            .dispatch(&closed, PartnerCommand::ViewCustomer(f.customer))
            .await
            .view;

        assert_eq!(opened.selected, reopened.selected);
        assert_eq!(f.gateway.call_count(GatewayOperation::ListDeliveries), 1);
    }
}
