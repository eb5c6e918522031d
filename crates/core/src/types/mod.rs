//! Core types for The Fruit Union.
//!
//! This module provides type-safe wrappers for the subscription and delivery
//! domain.

pub mod account;
pub mod customer;
pub mod delivery;
pub mod email;
pub mod id;
pub mod plans;
pub mod price;
pub mod stats;
pub mod status;

pub use account::{AccountError, NewCustomerAccount, NewCustomerForm};
pub use customer::{Customer, Profile};
pub use delivery::{Delivery, DeliveryStatusChange};
pub use email::{Email, EmailError, INTERNAL_LOGIN_DOMAIN};
pub use id::*;
pub use plans::{PricingPlan, pricing_plans};
pub use price::{CurrencyCode, Price};
pub use stats::DashboardStats;
pub use status::*;
