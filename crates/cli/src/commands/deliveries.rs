//! Delivery status updates.

use fruit_union_core::{CustomerId, DeliveryId, UserRole};
use fruit_union_dashboard::models::PartnerView;
use fruit_union_dashboard::services::{DeliveryPartnerController, PartnerCommand};

use super::{CliError, Connection, finish, print_deliveries};

/// Mark `id` delivered (now) or back to pending, then print the
/// customer's refreshed history.
pub async fn mark(
    connection: &Connection,
    id: DeliveryId,
    customer: CustomerId,
    delivered: bool,
) -> Result<(), CliError> {
    connection.require(UserRole::DeliveryPartner)?;

    let controller = DeliveryPartnerController::new(connection.gateway(), connection.history());
    let opened = controller
        .dispatch(&PartnerView::default(), PartnerCommand::ViewCustomer(customer))
        .await;
    finish(&opened)?;

    let command = if delivered {
        PartnerCommand::MarkDelivered {
            delivery_id: id,
            customer_id: customer,
        }
    } else {
        PartnerCommand::MarkPending {
            delivery_id: id,
            customer_id: customer,
        }
    };
    let outcome = controller.dispatch(&opened.view, command).await;
    finish(&outcome)?;

    if let Some(detail) = &outcome.view.selected {
        print_deliveries(&detail.deliveries);
    }
    Ok(())
}
