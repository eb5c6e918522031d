//! Customer roster and provisioning.

use fruit_union_core::{
    Customer, CustomerId, NewCustomerForm, SubscriptionPlan, SubscriptionStatus, UserRole,
};
use fruit_union_dashboard::models::{AdminView, CustomerDetail, PartnerView};
use fruit_union_dashboard::services::{
    AdminCommand, AdminController, DeliveryPartnerController, PartnerCommand,
};

use super::{CliError, Connection, finish, print_customers, print_deliveries};

/// Arguments for `customers create`.
pub struct CreateArgs {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub plan: Option<SubscriptionPlan>,
}

/// Run a roster command through whichever dashboard the role owns.
async fn roster(
    connection: &Connection,
    customer: Option<CustomerId>,
) -> Result<(Vec<Customer>, Option<CustomerDetail>), CliError> {
    match connection.role() {
        UserRole::Admin => {
            let controller = AdminController::new(connection.gateway(), connection.history());
            let command = customer.map_or(AdminCommand::Refresh, AdminCommand::ViewCustomer);
            let outcome = controller.dispatch(&AdminView::default(), command).await;
            finish(&outcome)?;
            Ok((outcome.view.customers, outcome.view.selected))
        }
        UserRole::DeliveryPartner => {
            let controller =
                DeliveryPartnerController::new(connection.gateway(), connection.history());
            let command = customer.map_or(PartnerCommand::Refresh, PartnerCommand::ViewCustomer);
            let outcome = controller.dispatch(&PartnerView::default(), command).await;
            finish(&outcome)?;
            Ok((outcome.view.customers, outcome.view.selected))
        }
        UserRole::Customer => Err(CliError::WrongRole {
            required: UserRole::Admin,
            actual: UserRole::Customer,
        }),
    }
}

pub async fn list(connection: &Connection) -> Result<(), CliError> {
    let (customers, _) = roster(connection, None).await?;
    print_customers(&customers);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn show(connection: &Connection, id: CustomerId) -> Result<(), CliError> {
    let (_, selected) = roster(connection, Some(id)).await?;
    let detail =
        selected.ok_or_else(|| CliError::ActionFailed("Customer not found".to_string()))?;

    let customer = &detail.customer;
    println!("{} ({})", customer.full_name(), customer.id);
    println!("  Phone:        {}", customer.phone_display());
    println!("  Plan:         {}", customer.subscription_plan);
    println!("  Status:       {}", customer.subscription_status);
    if let Some(date) = customer.next_payment_date {
        println!("  Next payment: {date}");
    }
    println!();
    print_deliveries(&detail.deliveries);
    Ok(())
}

pub async fn create(connection: &Connection, args: CreateArgs) -> Result<(), CliError> {
    connection.require(UserRole::Admin)?;

    let form = NewCustomerForm {
        username: args.username,
        password: args.password,
        full_name: args.full_name,
        phone: args.phone,
        subscription_plan: args.plan,
    };
    let outcome = AdminController::new(connection.gateway(), connection.history())
        .dispatch(&AdminView::default(), AdminCommand::CreateCustomer(form))
        .await;
    finish(&outcome)
}

pub async fn set_status(
    connection: &Connection,
    id: CustomerId,
    status: SubscriptionStatus,
) -> Result<(), CliError> {
    connection.require(UserRole::Admin)?;

    let outcome = AdminController::new(connection.gateway(), connection.history())
        .dispatch(
            &AdminView::default(),
            AdminCommand::SetSubscriptionStatus {
                customer_id: id,
                status,
            },
        )
        .await;
    finish(&outcome)
}
