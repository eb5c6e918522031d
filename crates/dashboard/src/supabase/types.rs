//! Wire types for backend requests and responses.

use fruit_union_core::{NewCustomerAccount, SubscriptionStatus, UserRole};
use serde::{Deserialize, Serialize};

/// Error body returned by PostgREST (`message`) or GoTrue (`msg`,
/// `error_description`).
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// The most specific message present in the body.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Parameters of the `create_customer_account` RPC.
#[derive(Debug, Serialize)]
pub struct CreateCustomerAccountParams<'a> {
    pub p_username: &'a str,
    pub p_password: &'a str,
    pub p_full_name: &'a str,
    pub p_phone: Option<&'a str>,
    pub p_subscription_plan: &'a str,
}

impl<'a> From<&'a NewCustomerAccount> for CreateCustomerAccountParams<'a> {
    fn from(account: &'a NewCustomerAccount) -> Self {
        Self {
            p_username: account.username(),
            p_password: account.password(),
            p_full_name: account.full_name(),
            p_phone: account.phone(),
            p_subscription_plan: account.plan().as_str(),
        }
    }
}

/// PATCH body for `customers`.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatusPatch {
    pub subscription_status: SubscriptionStatus,
}

/// Body of the password grant.
#[derive(Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of a `grant_type=refresh_token` request.
#[derive(Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Row of `user_roles`.
#[derive(Debug, Deserialize)]
pub struct RoleRow {
    pub role: UserRole,
}
