//! Login addresses.
//!
//! Staff sign in with a real mailbox. Customer accounts are provisioned
//! without one: their login is `<username>@internal.local`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Domain of every provisioned customer login.
pub const INTERNAL_LOGIN_DOMAIN: &str = "internal.local";

/// Longest address the auth backend accepts (RFC 5321).
const MAX_ADDRESS_LEN: usize = 254;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("login cannot be empty")]
    Empty,
    #[error("login must be at most {MAX_ADDRESS_LEN} characters")]
    TooLong,
    #[error("'{0}' is not an email address")]
    Malformed(String),
}

/// A login address, either a staff mailbox or a provisioned customer login.
///
/// ```
/// use fruit_union_core::Email;
///
/// let login = Email::from_login("jane_d").unwrap();
/// assert_eq!(login.as_str(), "jane_d@internal.local");
/// assert_eq!(login.domain(), "internal.local");
///
/// assert!(Email::from_login("ops@fruitunion.in").is_ok());
/// assert!(Email::from_login("ops@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse a full address: one `@` with something on both sides.
    ///
    /// # Errors
    ///
    /// Returns an error for empty, overlong or malformed input.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        match s.len() {
            0 => return Err(EmailError::Empty),
            n if n > MAX_ADDRESS_LEN => return Err(EmailError::TooLong),
            _ => {}
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && !s.chars().any(char::is_whitespace) =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed(s.to_owned())),
        }
    }

    /// The login a provisioned account gets for `username`.
    ///
    /// The username is used verbatim as the local part; the provisioning
    /// procedure is the authority on which usernames it accepts.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for an empty username.
    pub fn internal_login(username: &str) -> Result<Self, EmailError> {
        if username.is_empty() {
            return Err(EmailError::Empty);
        }
        Ok(Self(format!("{username}@{INTERNAL_LOGIN_DOMAIN}")))
    }

    /// Resolve what was typed into a login field: an address is taken as-is,
    /// a bare username becomes its internal login.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is neither.
    pub fn from_login(input: &str) -> Result<Self, EmailError> {
        let input = input.trim();
        if input.contains('@') {
            Self::parse(input)
        } else {
            Self::internal_login(input)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
