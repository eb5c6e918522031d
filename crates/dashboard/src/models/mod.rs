//! Domain models for the dashboards.

pub mod session;
pub mod views;

pub use session::{CurrentUser, SessionUser, keys as session_keys};
pub use views::{AdminView, CustomerDetail, PartnerView, RosterView};
