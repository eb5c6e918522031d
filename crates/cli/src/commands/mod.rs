//! CLI command implementations.
//!
//! Every command except `plans` signs in first and then drives the same
//! dashboard controllers the web server uses.

pub mod customers;
pub mod deliveries;
pub mod plans;
pub mod stats;

use fruit_union_core::{Customer, Delivery, Email, EmailError, UserRole};
use fruit_union_dashboard::config::{ConfigError, SupabaseConfig};
use fruit_union_dashboard::services::{DeliveryHistoryCache, NotificationKind, Outcome};
use fruit_union_dashboard::supabase::{SupabaseClient, SupabaseError, UserClient};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Backend configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `FRUIT_CLI_LOGIN` is not a usable login.
    #[error("Invalid login: {0}")]
    InvalidLogin(#[from] EmailError),

    /// Sign-in or role lookup failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SupabaseError),

    /// The account has no dashboard role.
    #[error("Account {0} has no dashboard role")]
    NoRole(Email),

    /// The command needs a different role.
    #[error("This command requires the {required} role (signed in as {actual})")]
    WrongRole { required: UserRole, actual: UserRole },

    /// The dashboard command reported a failure.
    #[error("{0}")]
    ActionFailed(String),
}

/// A signed-in CLI session.
pub struct Connection {
    client: SupabaseClient,
    gateway: UserClient,
    access_token: SecretString,
    role: UserRole,
    history: DeliveryHistoryCache,
}

impl Connection {
    pub const fn gateway(&self) -> &UserClient {
        &self.gateway
    }

    pub const fn history(&self) -> &DeliveryHistoryCache {
        &self.history
    }

    pub const fn role(&self) -> UserRole {
        self.role
    }

    /// Fail unless signed in as `required`.
    pub fn require(&self, required: UserRole) -> Result<(), CliError> {
        if self.role == required {
            Ok(())
        } else {
            Err(CliError::WrongRole {
                required,
                actual: self.role,
            })
        }
    }

    /// Sign out of the backend. Failures are logged only.
    pub async fn close(self) {
        if let Err(e) = self.client.sign_out(self.access_token.expose_secret()).await {
            tracing::warn!(error = %e, "Sign-out failed");
        }
    }
}

/// Sign in with `FRUIT_CLI_LOGIN` / `FRUIT_CLI_PASSWORD`.
pub async fn connect() -> Result<Connection, CliError> {
    dotenvy::dotenv().ok();

    let config = SupabaseConfig::from_env()?;
    let login =
        std::env::var("FRUIT_CLI_LOGIN").map_err(|_| CliError::MissingEnvVar("FRUIT_CLI_LOGIN"))?;
    let password = SecretString::from(
        std::env::var("FRUIT_CLI_PASSWORD")
            .map_err(|_| CliError::MissingEnvVar("FRUIT_CLI_PASSWORD"))?,
    );
    let email = Email::from_login(&login)?;

    tracing::info!("Signing in as {}...", email);
    let client = SupabaseClient::new(&config);
    let session = client
        .sign_in_with_password(&email, password.expose_secret())
        .await?;
    let role = client
        .fetch_role(&session.access_token, session.user.id)
        .await?
        .filter(|role| role.dashboard_path().is_some())
        .ok_or_else(|| CliError::NoRole(email.clone()))?;
    tracing::info!("Signed in as {} ({})", email, role);

    Ok(Connection {
        gateway: client.for_user(&session.access_token),
        access_token: SecretString::from(session.access_token),
        client,
        role,
        // One command per process; nothing to reuse.
        history: DeliveryHistoryCache::disabled(),
    })
}

/// Print the notification and turn a failed outcome into an error.
#[allow(clippy::print_stdout)]
pub fn finish<V>(outcome: &Outcome<V>) -> Result<(), CliError> {
    if let Some(notification) = &outcome.notification {
        match notification.kind {
            NotificationKind::Success => println!("✓ {}", notification.message),
            NotificationKind::Error => println!("✗ {}", notification.message),
        }
    }

    if outcome.is_failure() {
        let message = outcome
            .notification
            .as_ref()
            .map_or_else(|| "Backend request failed".to_string(), |n| n.message.clone());
        return Err(CliError::ActionFailed(message));
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn print_customers(customers: &[Customer]) {
    if customers.is_empty() {
        println!("No customers.");
        return;
    }
    println!(
        "{:<36}  {:<24}  {:<14}  {:<10}  {:<8}  NEXT PAYMENT",
        "ID", "NAME", "PHONE", "PLAN", "STATUS"
    );
    for customer in customers {
        let next_payment = customer
            .next_payment_date
            .map_or_else(|| "-".to_string(), |d| d.to_string());
        println!(
            "{:<36}  {:<24}  {:<14}  {:<10}  {:<8}  {}",
            customer.id,
            customer.full_name(),
            customer.phone_display(),
            customer.subscription_plan,
            customer.subscription_status,
            next_payment
        );
    }
}

#[allow(clippy::print_stdout)]
pub fn print_deliveries(deliveries: &[Delivery]) {
    if deliveries.is_empty() {
        println!("No deliveries.");
        return;
    }
    println!(
        "{:<36}  {:<10}  {:<10}  {:<25}  ITEMS",
        "ID", "DATE", "STATUS", "DELIVERED AT"
    );
    for delivery in deliveries {
        let delivered_at = delivery
            .delivered_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string());
        println!(
            "{:<36}  {:<10}  {:<10}  {:<25}  {}",
            delivery.id, delivery.delivery_date, delivery.delivery_status, delivered_at, delivery.items
        );
    }
}
