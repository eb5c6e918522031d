//! Dashboard counts.

use fruit_union_core::UserRole;
use fruit_union_dashboard::models::AdminView;
use fruit_union_dashboard::services::{AdminCommand, AdminController};

use super::{CliError, Connection, finish};

#[allow(clippy::print_stdout)]
pub async fn show(connection: &Connection) -> Result<(), CliError> {
    connection.require(UserRole::Admin)?;

    let outcome = AdminController::new(connection.gateway(), connection.history())
        .dispatch(&AdminView::default(), AdminCommand::Refresh)
        .await;
    finish(&outcome)?;

    let stats = outcome.view.stats;
    println!("Total customers:   {}", stats.total_customers);
    println!("Total deliveries:  {}", stats.total_deliveries);
    println!("Delivery partners: {}", stats.total_partners);
    println!("Active deliveries: {}", stats.active_deliveries);
    Ok(())
}
