//! Customer account provisioning input.
//!
//! [`NewCustomerForm`] is what an operator typed; [`NewCustomerAccount`] is
//! the validated request handed to the provisioning procedure. Validation
//! happens before any remote call is made.

use serde::{Deserialize, Serialize};

use super::{Email, SubscriptionPlan};

/// Errors raised while validating a provisioning form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// One or more required fields were left blank.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<&'static str>),
}

/// Raw provisioning input, exactly as entered.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct NewCustomerForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subscription_plan: Option<SubscriptionPlan>,
}

impl std::fmt::Debug for NewCustomerForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCustomerForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .field("subscription_plan", &self.subscription_plan)
            .finish()
    }
}

/// A validated request to create a customer account.
#[derive(Clone, PartialEq, Eq)]
pub struct NewCustomerAccount {
    username: String,
    password: String,
    full_name: String,
    phone: Option<String>,
    plan: SubscriptionPlan,
    login: Email,
}

impl NewCustomerAccount {
    /// Validate a provisioning form.
    ///
    /// Username, password and full name must be non-blank. The username is
    /// kept exactly as typed since the provisioning procedure derives the
    /// login from it. A blank phone is dropped and a missing plan defaults
    /// to basic.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::MissingRequiredFields`] naming every blank
    /// required field.
    pub fn from_form(form: &NewCustomerForm) -> Result<Self, AccountError> {
        let full_name = form.full_name.trim();
        let login = Email::internal_login(&form.username)
            .ok()
            .filter(|_| !form.username.trim().is_empty());

        let missing: Vec<&'static str> = [
            ("username", login.is_none()),
            ("password", form.password.is_empty()),
            ("full_name", full_name.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, blank)| blank.then_some(field))
        .collect();

        let login = match login {
            Some(login) if missing.is_empty() => login,
            _ => return Err(AccountError::MissingRequiredFields(missing)),
        };

        let phone = form
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Ok(Self {
            username: form.username.clone(),
            password: form.password.clone(),
            full_name: full_name.to_owned(),
            phone,
            plan: form.subscription_plan.unwrap_or_default(),
            login,
        })
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub const fn plan(&self) -> SubscriptionPlan {
        self.plan
    }

    /// Address the new customer signs in with (`<username>@internal.local`).
    #[must_use]
    pub const fn login_address(&self) -> &Email {
        &self.login
    }
}

impl std::fmt::Debug for NewCustomerAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCustomerAccount")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .field("plan", &self.plan)
            .finish()
    }
}
