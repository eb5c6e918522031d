//! The Fruit Union CLI - dashboard operations from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Dashboard counts (admin)
//! fruit-cli stats
//!
//! # Customer roster and one customer's deliveries
//! fruit-cli customers list
//! fruit-cli customers show 0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21
//!
//! # Provision a customer account (admin)
//! fruit-cli customers create -u jane_d -p secret123 -n "Jane Doe" --plan premium
//!
//! # Pause a subscription (admin)
//! fruit-cli customers set-status 0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21 inactive
//!
//! # Record a drop-off (delivery partner)
//! fruit-cli deliveries mark 6f1c2b1e-8d3a-4a7e-9a51-0d1f5e2c9b10 \
//!     --customer 0b7f8a4e-3c51-4f3e-8f60-5d2b9c1a7e21 delivered
//!
//! # Pricing catalog (no sign-in)
//! fruit-cli plans
//! ```
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY` - backend project
//! - `FRUIT_CLI_LOGIN` - email address or bare username
//! - `FRUIT_CLI_PASSWORD` - password for that login

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use fruit_union_core::{CustomerId, DeliveryId, SubscriptionPlan, SubscriptionStatus};

mod commands;

#[derive(Parser)]
#[command(name = "fruit-cli")]
#[command(author, version, about = "The Fruit Union dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dashboard counts (admin)
    Stats,
    /// Manage customers
    Customers {
        #[command(subcommand)]
        action: CustomerAction,
    },
    /// Update deliveries (delivery partner)
    Deliveries {
        #[command(subcommand)]
        action: DeliveryAction,
    },
    /// Show the pricing catalog
    Plans,
}

#[derive(Subcommand)]
enum CustomerAction {
    /// List all customers, newest first
    List,
    /// Show one customer's delivery history
    Show {
        /// Customer ID
        id: CustomerId,
    },
    /// Provision a new customer account (admin)
    Create {
        /// Username; the login becomes `<username>@internal.local`
        #[arg(short, long)]
        username: String,

        /// Initial password
        #[arg(short, long)]
        password: String,

        /// Full name
        #[arg(short = 'n', long)]
        full_name: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Subscription plan (`basic`, `premium`, `enterprise`)
        #[arg(long)]
        plan: Option<SubscriptionPlan>,
    },
    /// Set a customer's subscription status (admin)
    SetStatus {
        /// Customer ID
        id: CustomerId,

        /// `active` or `inactive`
        status: SubscriptionStatus,
    },
}

#[derive(Subcommand)]
enum DeliveryAction {
    /// Mark a delivery as delivered or back to pending
    Mark {
        /// Delivery ID
        id: DeliveryId,

        /// Customer the delivery belongs to
        #[arg(short, long)]
        customer: CustomerId,

        /// New state
        #[arg(value_enum)]
        state: MarkState,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MarkState {
    Delivered,
    Pending,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    if matches!(cli.command, Commands::Plans) {
        commands::plans::show();
        return Ok(());
    }

    let connection = commands::connect().await?;
    let result = match cli.command {
        Commands::Stats => commands::stats::show(&connection).await,
        Commands::Customers { action } => match action {
            CustomerAction::List => commands::customers::list(&connection).await,
            CustomerAction::Show { id } => commands::customers::show(&connection, id).await,
            CustomerAction::Create {
                username,
                password,
                full_name,
                phone,
                plan,
            } => {
                commands::customers::create(
                    &connection,
                    commands::customers::CreateArgs {
                        username,
                        password,
                        full_name,
                        phone,
                        plan,
                    },
                )
                .await
            }
            CustomerAction::SetStatus { id, status } => {
                commands::customers::set_status(&connection, id, status).await
            }
        },
        Commands::Deliveries { action } => match action {
            DeliveryAction::Mark {
                id,
                customer,
                state,
            } => {
                let delivered = matches!(state, MarkState::Delivered);
                commands::deliveries::mark(&connection, id, customer, delivered).await
            }
        },
        Commands::Plans => Ok(()),
    };

    connection.close().await;
    result
}
